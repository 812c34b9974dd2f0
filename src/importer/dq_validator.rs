// ==========================================
// 仓储管理数据导入系统 - 数据质量校验器实现
// ==========================================
// 职责: 实体级校验（阶段 3）
// 规则: 重复键首次出现生效; 周快照必须落在周一;
//       账期为 16 日至次月 15 日; 周费用按 托盘×费率 复核
// ==========================================

use crate::domain::records::{
    CostRateRecord, InventoryBalanceRecord, InventoryLedgerEntry, InvoiceInputRecord, SkuRecord,
    StorageLedgerEntry, WarehouseConfigRecord,
};
use crate::domain::report::{IssueKind, IssueSeverity, ValidationIssue};
use crate::domain::types::{EntityKind, TransactionType};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

pub struct DqValidator {
    cost_tolerance: f64, // 金额复核容差（四舍五入口径）
}

impl DqValidator {
    pub fn new(cost_tolerance: f64) -> Self {
        Self { cost_tolerance }
    }

    /// 账期校验: 起于 16 日,止于次月 15 日
    pub fn is_valid_billing_period(start: NaiveDate, end: NaiveDate) -> bool {
        if start.day() != 16 || end.day() != 15 {
            return false;
        }
        let (next_year, next_month) = if start.month() == 12 {
            (start.year() + 1, 1)
        } else {
            (start.year(), start.month() + 1)
        };
        end.year() == next_year && end.month() == next_month
    }

    fn billing_period_issue(
        sheet: &str,
        row_number: usize,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ValidationIssue {
        ValidationIssue::row_level(
            IssueSeverity::Warning,
            IssueKind::BillingPeriod,
            sheet,
            row_number,
            Some("Billing_Period_Start".to_string()),
            Some(format!("{} .. {}", start, end)),
            "账期必须从当月 16 日起至次月 15 日止".to_string(),
        )
    }

    // ==========================================
    // SKU 主数据
    // ==========================================
    // 重复 SKU: 首次出现生效,后续行记警告并剔除
    pub fn validate_skus(
        &self,
        records: Vec<SkuRecord>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<SkuRecord> {
        let sheet = EntityKind::SkuMaster.sheet_name();
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for record in records {
            if !seen.insert(record.sku_code.clone()) {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::DuplicateKey,
                    sheet,
                    record.row_number,
                    Some("SKU".to_string()),
                    Some(record.sku_code.clone()),
                    "重复 SKU,首次出现生效".to_string(),
                ));
                continue;
            }

            if record.units_per_carton < 1 {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::RowValidation,
                    sheet,
                    record.row_number,
                    Some("Units_Per_Carton".to_string()),
                    Some(record.units_per_carton.to_string()),
                    "每箱件数应不小于 1".to_string(),
                ));
            }
            if record.carton_weight_kg <= 0.0 {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::RowValidation,
                    sheet,
                    record.row_number,
                    Some("Carton_Weight_KG".to_string()),
                    Some(format!("{:.3}", record.carton_weight_kg)),
                    "整箱重量应大于 0".to_string(),
                ));
            }

            kept.push(record);
        }

        kept
    }

    // ==========================================
    // 仓库-SKU 托盘配置
    // ==========================================
    pub fn validate_warehouse_configs(
        &self,
        records: Vec<WarehouseConfigRecord>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<WarehouseConfigRecord> {
        let sheet = EntityKind::WarehouseConfig.sheet_name();
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for record in records {
            let key = (record.warehouse.clone(), record.sku_code.clone());
            if !seen.insert(key) {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::DuplicateKey,
                    sheet,
                    record.row_number,
                    Some("SKU".to_string()),
                    Some(format!("{}/{}", record.warehouse, record.sku_code)),
                    "重复 (仓库, SKU) 配置,首次出现生效".to_string(),
                ));
                continue;
            }

            for (column, value) in [
                (
                    "Storage_Cartons_Per_Pallet",
                    record.storage_cartons_per_pallet,
                ),
                (
                    "Shipping_Cartons_Per_Pallet",
                    record.shipping_cartons_per_pallet,
                ),
            ] {
                if value < 1 {
                    issues.push(ValidationIssue::row_level(
                        IssueSeverity::Warning,
                        IssueKind::RowValidation,
                        sheet,
                        record.row_number,
                        Some(column.to_string()),
                        Some(value.to_string()),
                        "每托盘箱数应不小于 1".to_string(),
                    ));
                }
            }

            kept.push(record);
        }

        kept
    }

    // ==========================================
    // 费率主数据
    // ==========================================
    // 键: (仓库, 费用名称, 生效日期),与源系统 upsert 口径一致
    pub fn validate_cost_rates(
        &self,
        records: Vec<CostRateRecord>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<CostRateRecord> {
        let sheet = EntityKind::CostMaster.sheet_name();
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for record in records {
            let key = (
                record.warehouse.clone(),
                record.cost_name.clone(),
                record.effective_date,
            );
            if !seen.insert(key) {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::DuplicateKey,
                    sheet,
                    record.row_number,
                    Some("cost_name".to_string()),
                    Some(format!("{}/{}", record.warehouse, record.cost_name)),
                    "重复费率行,首次出现生效".to_string(),
                ));
                continue;
            }

            if record.cost_value < 0.0 {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::RowValidation,
                    sheet,
                    record.row_number,
                    Some("cost_value".to_string()),
                    Some(format!("{:.4}", record.cost_value)),
                    "费用单价为负数".to_string(),
                ));
            }

            kept.push(record);
        }

        kept
    }

    // ==========================================
    // 库存流水账
    // ==========================================
    // 入库行带出库箱数（或出库行带入库箱数）视为口径混用,
    // 记警告但保留,重放时两列都计入
    pub fn validate_ledger(
        &self,
        records: &[InventoryLedgerEntry],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let sheet = EntityKind::InventoryLedger.sheet_name();
        for entry in records {
            let (column, mismatch) = match entry.transaction_type {
                TransactionType::Receive => ("Cartons_Out", entry.cartons_out > 0),
                TransactionType::Ship => ("Cartons_In", entry.cartons_in > 0),
                TransactionType::Adjust => ("", false),
            };
            if mismatch {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::RowValidation,
                    sheet,
                    entry.row_number,
                    Some(column.to_string()),
                    None,
                    format!("{} 交易携带反向箱数", entry.transaction_type),
                ));
            }
        }
    }

    // ==========================================
    // 库存余额（表内申报值）
    // ==========================================
    // 申报余额为负直接违反余额不变式,剔除
    pub fn validate_balances(
        &self,
        records: Vec<InventoryBalanceRecord>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<InventoryBalanceRecord> {
        let sheet = EntityKind::InventoryBalance.sheet_name();
        let mut kept = Vec::new();

        for record in records {
            if record.current_cartons < 0 {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Error,
                    IssueKind::BalanceInvariant,
                    sheet,
                    record.row_number,
                    Some("Current_Cartons".to_string()),
                    Some(record.current_cartons.to_string()),
                    "申报余额为负数".to_string(),
                ));
                continue;
            }
            kept.push(record);
        }

        kept
    }

    // ==========================================
    // 仓储费周快照
    // ==========================================
    // 周截止日必须为周一（非周一行剔除）;
    // 周费用按 计费托盘 × 周费率 复核
    pub fn validate_storage_ledger(
        &self,
        records: Vec<StorageLedgerEntry>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<StorageLedgerEntry> {
        let sheet = EntityKind::StorageLedger.sheet_name();
        let mut kept = Vec::new();

        for record in records {
            if record.week_ending_date.weekday() != Weekday::Mon {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Error,
                    IssueKind::RowValidation,
                    sheet,
                    record.row_number,
                    Some("Week_Ending_Date".to_string()),
                    Some(record.week_ending_date.to_string()),
                    "周截止日必须为周一".to_string(),
                ));
                continue;
            }

            let expected = record.storage_pallets_charged as f64 * record.applicable_weekly_rate;
            if (record.calculated_weekly_cost - expected).abs() > self.cost_tolerance {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::CostMismatch,
                    sheet,
                    record.row_number,
                    Some("Calculated_Weekly_Cost".to_string()),
                    Some(format!("{:.2}", record.calculated_weekly_cost)),
                    format!(
                        "周费用与 托盘×费率 不一致（期望 {:.2}）",
                        expected
                    ),
                ));
            }

            if let (Some(start), Some(end)) =
                (record.billing_period_start, record.billing_period_end)
            {
                if !Self::is_valid_billing_period(start, end) {
                    issues.push(Self::billing_period_issue(
                        sheet,
                        record.row_number,
                        start,
                        end,
                    ));
                }
            }

            kept.push(record);
        }

        kept
    }

    // ==========================================
    // 发票录入
    // ==========================================
    pub fn validate_invoice_inputs(
        &self,
        records: &[InvoiceInputRecord],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let sheet = EntityKind::InvoiceInput.sheet_name();
        for record in records {
            if !Self::is_valid_billing_period(record.billing_period_start, record.billing_period_end)
            {
                issues.push(Self::billing_period_issue(
                    sheet,
                    record.row_number,
                    record.billing_period_start,
                    record.billing_period_end,
                ));
            }

            if record.invoiced_amount < 0.0 {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::RowValidation,
                    sheet,
                    record.row_number,
                    Some("Invoiced_Amount".to_string()),
                    Some(format!("{:.2}", record.invoiced_amount)),
                    "开票金额为负数".to_string(),
                ));
            }
        }
    }

    // ==========================================
    // 计算费用账
    // ==========================================
    pub fn validate_calculated_costs(
        &self,
        records: &[crate::domain::records::CalculatedCostLedgerRecord],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let sheet = EntityKind::CalculatedCostsLedger.sheet_name();
        for record in records {
            if let (Some(start), Some(end)) =
                (record.billing_period_start, record.billing_period_end)
            {
                if !Self::is_valid_billing_period(start, end) {
                    issues.push(Self::billing_period_issue(
                        sheet,
                        record.row_number,
                        start,
                        end,
                    ));
                }
            }

            let expected = record.quantity * record.rate;
            if (record.amount - expected).abs() > self.cost_tolerance {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::CostMismatch,
                    sheet,
                    record.row_number,
                    Some("Amount".to_string()),
                    Some(format!("{:.2}", record.amount)),
                    format!("金额与 数量×单价 不一致（期望 {:.2}）", expected),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sku(code: &str, row_number: usize) -> SkuRecord {
        SkuRecord {
            sku_code: code.to_string(),
            description: None,
            asin: None,
            pack_size: None,
            material: None,
            unit_dimensions_cm: None,
            unit_weight_kg: None,
            units_per_carton: 24,
            carton_dimensions_cm: None,
            carton_weight_kg: 9.8,
            packaging_type: None,
            notes: None,
            row_number,
        }
    }

    fn storage_entry(week_ending: NaiveDate, row_number: usize) -> StorageLedgerEntry {
        StorageLedgerEntry {
            week_ending_date: week_ending,
            warehouse: "FMC".to_string(),
            sku_code: "CS-007".to_string(),
            batch_lot: "DEFAULT".to_string(),
            cartons_end_of_monday: 60,
            storage_pallets_charged: 2,
            applicable_weekly_rate: 3.5,
            calculated_weekly_cost: 7.0,
            billing_period_start: None,
            billing_period_end: None,
            row_number,
        }
    }

    #[test]
    fn test_duplicate_sku_first_wins() {
        let mut issues = Vec::new();
        let validator = DqValidator::new(0.01);
        let kept = validator.validate_skus(
            vec![sku("CS-007", 2), sku("CS-011", 3), sku("CS-007", 4)],
            &mut issues,
        );

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].row_number, 2);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DuplicateKey);
        assert_eq!(issues[0].row_number, Some(4));
    }

    #[test]
    fn test_billing_period_rule() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        assert!(DqValidator::is_valid_billing_period(start, end));

        // 年末滚动
        let start = NaiveDate::from_ymd_opt(2024, 12, 16).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert!(DqValidator::is_valid_billing_period(start, end));

        // 起始日不是 16 日
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
        assert!(!DqValidator::is_valid_billing_period(start, end));

        // 跨两个月
        let start = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert!(!DqValidator::is_valid_billing_period(start, end));
    }

    #[test]
    fn test_storage_ledger_rejects_non_monday() {
        // 2024-03-05 是周二
        let tuesday = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let mut issues = Vec::new();
        let kept =
            DqValidator::new(0.01).validate_storage_ledger(vec![storage_entry(tuesday, 2)], &mut issues);

        assert!(kept.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Error);
        assert!(issues[0].message.contains("周一"));
    }

    #[test]
    fn test_storage_ledger_cost_recompute() {
        // 2024-03-04 是周一
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut entry = storage_entry(monday, 2);
        entry.calculated_weekly_cost = 9.0; // 期望 2 × 3.5 = 7.0

        let mut issues = Vec::new();
        let kept = DqValidator::new(0.01).validate_storage_ledger(vec![entry], &mut issues);

        assert_eq!(kept.len(), 1);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::CostMismatch);
    }

    #[test]
    fn test_ledger_side_mismatch_warning() {
        let entry = InventoryLedgerEntry {
            transaction_id: None,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            warehouse: "FMC".to_string(),
            sku_code: "CS-007".to_string(),
            batch_lot: "DEFAULT".to_string(),
            transaction_type: TransactionType::Receive,
            reference_id: None,
            cartons_in: 10,
            cartons_out: 2,
            storage_pallets_in: None,
            shipping_pallets_out: None,
            notes: None,
            row_number: 2,
        };

        let mut issues = Vec::new();
        DqValidator::new(0.01).validate_ledger(&[entry], &mut issues);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Warning);
        assert_eq!(issues[0].column.as_deref(), Some("Cartons_Out"));
    }
}
