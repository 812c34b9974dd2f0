// ==========================================
// 仓储管理数据导入系统 - 引用完整性校验器实现
// ==========================================
// 职责: 跨实体引用校验（阶段 4）
// 规则: 悬空 SKU 引用 → 每行恰好一条 ReferentialIntegrity 错误,
//       该行从已校验输出中剔除;
//       流水账 (仓库, SKU) 缺少托盘配置 → 错误但保留
//       （该行仍参与余额重放）
// ==========================================

use crate::domain::records::{
    InventoryBalanceRecord, InventoryLedgerEntry, StorageLedgerEntry, WarehouseConfigRecord,
};
use crate::domain::report::{IssueKind, IssueSeverity, ValidationIssue};
use crate::domain::types::EntityKind;
use std::collections::HashSet;

pub struct RefChecker<'a> {
    known_skus: HashSet<&'a str>,
}

impl<'a> RefChecker<'a> {
    /// 以 SKU 主数据为事实口径构建校验器
    pub fn new(known_skus: impl Iterator<Item = &'a str>) -> Self {
        Self {
            known_skus: known_skus.collect(),
        }
    }

    fn dangling_sku_issue(
        sheet: &str,
        row_number: usize,
        sku_code: &str,
    ) -> ValidationIssue {
        ValidationIssue::row_level(
            IssueSeverity::Error,
            IssueKind::ReferentialIntegrity,
            sheet,
            row_number,
            Some("SKU".to_string()),
            Some(sku_code.to_string()),
            "SKU 不存在于 SKU 主数据".to_string(),
        )
    }

    /// 托盘配置: 悬空 SKU 行剔除
    pub fn check_warehouse_configs(
        &self,
        records: Vec<WarehouseConfigRecord>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<WarehouseConfigRecord> {
        let sheet = EntityKind::WarehouseConfig.sheet_name();
        records
            .into_iter()
            .filter(|r| {
                let known = self.known_skus.contains(r.sku_code.as_str());
                if !known {
                    issues.push(Self::dangling_sku_issue(sheet, r.row_number, &r.sku_code));
                }
                known
            })
            .collect()
    }

    /// 流水账: 悬空 SKU 行剔除; (仓库, SKU) 缺少托盘配置记错误但保留
    pub fn check_ledger(
        &self,
        records: Vec<InventoryLedgerEntry>,
        configs: &[WarehouseConfigRecord],
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<InventoryLedgerEntry> {
        let sheet = EntityKind::InventoryLedger.sheet_name();
        let config_pairs: HashSet<(&str, &str)> = configs
            .iter()
            .map(|c| (c.warehouse.as_str(), c.sku_code.as_str()))
            .collect();

        let mut kept = Vec::new();
        for entry in records {
            if !self.known_skus.contains(entry.sku_code.as_str()) {
                issues.push(Self::dangling_sku_issue(
                    sheet,
                    entry.row_number,
                    &entry.sku_code,
                ));
                continue;
            }

            if !config_pairs.contains(&(entry.warehouse.as_str(), entry.sku_code.as_str())) {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Error,
                    IssueKind::ReferentialIntegrity,
                    sheet,
                    entry.row_number,
                    Some("Warehouse".to_string()),
                    Some(format!("{}/{}", entry.warehouse, entry.sku_code)),
                    "该 (仓库, SKU) 缺少托盘配置行".to_string(),
                ));
            }

            kept.push(entry);
        }

        kept
    }

    /// 库存余额表: 悬空 SKU 行剔除
    pub fn check_balances(
        &self,
        records: Vec<InventoryBalanceRecord>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<InventoryBalanceRecord> {
        let sheet = EntityKind::InventoryBalance.sheet_name();
        records
            .into_iter()
            .filter(|r| {
                let known = self.known_skus.contains(r.sku_code.as_str());
                if !known {
                    issues.push(Self::dangling_sku_issue(sheet, r.row_number, &r.sku_code));
                }
                known
            })
            .collect()
    }

    /// 仓储费周快照: 悬空 SKU 行剔除
    pub fn check_storage_ledger(
        &self,
        records: Vec<StorageLedgerEntry>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<StorageLedgerEntry> {
        let sheet = EntityKind::StorageLedger.sheet_name();
        records
            .into_iter()
            .filter(|r| {
                let known = self.known_skus.contains(r.sku_code.as_str());
                if !known {
                    issues.push(Self::dangling_sku_issue(sheet, r.row_number, &r.sku_code));
                }
                known
            })
            .collect()
    }
}
