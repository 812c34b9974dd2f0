// ==========================================
// 仓储管理数据导入系统 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 已校验实体记录（阶段 2）
// 规则: 必填缺失/不可转换 → ERROR,该行剔除;
//       可选列不可转换 → WARNING,按缺失处理;
//       任何问题都带 表名+行号+列名+原始值 坐标
// ==========================================

use crate::domain::records::{
    CalculatedCostLedgerRecord, CostRateRecord, InventoryBalanceRecord, InventoryLedgerEntry,
    InvoiceInputRecord, SkuRecord, StorageLedgerEntry, WarehouseConfigRecord,
};
use crate::domain::report::{IssueKind, IssueSeverity, ValidationIssue};
use crate::domain::types::{CostCategory, TransactionType};
use crate::importer::file_parser::RawRow;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// 缺省批次号（源数据缺失 Batch_Lot 时的口径）
pub const DEFAULT_BATCH_LOT: &str = "DEFAULT";

// Excel 日期序列号纪元: 1899-12-30（1970-01-01 为第 25569 天）
const EXCEL_EPOCH_YMD: (i32, u32, u32) = (1899, 12, 30);
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0; // 9999-12-31

// ==========================================
// 原始值解析
// ==========================================

/// 解析整数（兼容 "24" 与 Excel 数值单元格的 "24.0"）
fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

/// 解析小数
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// 解析日期
///
/// 兼容格式:
/// - YYYY-MM-DD / YYYYMMDD / MM/DD/YYYY
/// - 带时间的变体（取日期部分）
/// - Excel 日期序列号（数值单元格）
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    for fmt in ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    // Excel 序列号
    if let Ok(serial) = trimmed.parse::<f64>() {
        if serial >= 1.0 && serial <= EXCEL_SERIAL_MAX {
            let (y, m, d) = EXCEL_EPOCH_YMD;
            let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
            return epoch.checked_add_signed(Duration::days(serial.trunc() as i64));
        }
    }

    None
}

// ==========================================
// RowReader - 单表读取上下文
// ==========================================
// 持有该表已解析的列映射（标准列名 → 实际表头）,
// 所有取值/转换经由此处,保证问题坐标一致
pub struct RowReader<'a> {
    sheet: &'a str,
    resolved: &'a HashMap<&'static str, String>,
}

impl<'a> RowReader<'a> {
    pub fn new(sheet: &'a str, resolved: &'a HashMap<&'static str, String>) -> Self {
        Self { sheet, resolved }
    }

    fn raw<'r>(&self, row: &'r RawRow, column: &'static str) -> Option<&'r str> {
        let actual = self.resolved.get(column)?;
        row.get(actual)
    }

    fn push_issue(
        &self,
        issues: &mut Vec<ValidationIssue>,
        severity: IssueSeverity,
        row: &RawRow,
        column: &'static str,
        raw_value: Option<String>,
        message: String,
    ) {
        issues.push(ValidationIssue::row_level(
            severity,
            IssueKind::RowValidation,
            self.sheet,
            row.row_number,
            Some(column.to_string()),
            raw_value,
            message,
        ));
    }

    // ===== 文本 =====

    pub fn string(&self, row: &RawRow, column: &'static str) -> Option<String> {
        self.raw(row, column).map(|v| v.to_string())
    }

    pub fn required_string(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<String> {
        match self.raw(row, column) {
            Some(v) => Some(v.to_string()),
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Error,
                    row,
                    column,
                    None,
                    "必填字段缺失".to_string(),
                );
                None
            }
        }
    }

    // ===== 整数 =====

    pub fn integer(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<i64> {
        let raw = self.raw(row, column)?;
        match parse_integer(raw) {
            Some(v) => Some(v),
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Warning,
                    row,
                    column,
                    Some(raw.to_string()),
                    format!("无法解析为整数: {}", raw),
                );
                None
            }
        }
    }

    pub fn required_integer(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<i64> {
        match self.raw(row, column) {
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Error,
                    row,
                    column,
                    None,
                    "必填字段缺失".to_string(),
                );
                None
            }
            Some(raw) => match parse_integer(raw) {
                Some(v) => Some(v),
                None => {
                    self.push_issue(
                        issues,
                        IssueSeverity::Error,
                        row,
                        column,
                        Some(raw.to_string()),
                        format!("无法解析为整数: {}", raw),
                    );
                    None
                }
            },
        }
    }

    // ===== 小数 =====

    pub fn decimal(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<f64> {
        let raw = self.raw(row, column)?;
        match parse_decimal(raw) {
            Some(v) => Some(v),
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Warning,
                    row,
                    column,
                    Some(raw.to_string()),
                    format!("无法解析为小数: {}", raw),
                );
                None
            }
        }
    }

    pub fn required_decimal(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<f64> {
        match self.raw(row, column) {
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Error,
                    row,
                    column,
                    None,
                    "必填字段缺失".to_string(),
                );
                None
            }
            Some(raw) => match parse_decimal(raw) {
                Some(v) => Some(v),
                None => {
                    self.push_issue(
                        issues,
                        IssueSeverity::Error,
                        row,
                        column,
                        Some(raw.to_string()),
                        format!("无法解析为小数: {}", raw),
                    );
                    None
                }
            },
        }
    }

    // ===== 日期 =====

    pub fn date(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<NaiveDate> {
        let raw = self.raw(row, column)?;
        match parse_date(raw) {
            Some(v) => Some(v),
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Warning,
                    row,
                    column,
                    Some(raw.to_string()),
                    format!("日期格式错误: {}", raw),
                );
                None
            }
        }
    }

    pub fn required_date(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<NaiveDate> {
        match self.raw(row, column) {
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Error,
                    row,
                    column,
                    None,
                    "必填字段缺失".to_string(),
                );
                None
            }
            Some(raw) => match parse_date(raw) {
                Some(v) => Some(v),
                None => {
                    self.push_issue(
                        issues,
                        IssueSeverity::Error,
                        row,
                        column,
                        Some(raw.to_string()),
                        format!("日期格式错误: {}", raw),
                    );
                    None
                }
            },
        }
    }

    // ===== 枚举 =====

    pub fn required_transaction_type(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<TransactionType> {
        match self.raw(row, column) {
            None => {
                self.push_issue(
                    issues,
                    IssueSeverity::Error,
                    row,
                    column,
                    None,
                    "必填字段缺失".to_string(),
                );
                None
            }
            Some(raw) => match TransactionType::parse(raw) {
                Some(v) => Some(v),
                None => {
                    self.push_issue(
                        issues,
                        IssueSeverity::Error,
                        row,
                        column,
                        Some(raw.to_string()),
                        format!("非法交易类型: {}（期望 RECEIVE/SHIP/ADJUST）", raw),
                    );
                    None
                }
            },
        }
    }

    /// 费用类别: 未知值回落 Accessorial 并记 INFO（源系统口径）
    pub fn cost_category_lenient(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<CostCategory> {
        let raw = self.raw(row, column)?;
        let (category, fell_back) = CostCategory::parse_lenient(raw);
        if fell_back {
            issues.push(ValidationIssue::row_level(
                IssueSeverity::Info,
                IssueKind::CategoryFallback,
                self.sheet,
                row.row_number,
                Some(column.to_string()),
                Some(raw.to_string()),
                format!("未知费用类别,回落为 {}", CostCategory::Accessorial),
            ));
        }
        Some(category)
    }

    /// 非负整数,缺省为 0（流水账箱数口径）
    pub fn cartons(
        &self,
        row: &RawRow,
        column: &'static str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<i64> {
        match self.raw(row, column) {
            None => Some(0),
            Some(raw) => match parse_integer(raw) {
                Some(v) if v >= 0 => Some(v),
                Some(v) => {
                    self.push_issue(
                        issues,
                        IssueSeverity::Error,
                        row,
                        column,
                        Some(raw.to_string()),
                        format!("箱数为负数: {}", v),
                    );
                    None
                }
                None => {
                    self.push_issue(
                        issues,
                        IssueSeverity::Error,
                        row,
                        column,
                        Some(raw.to_string()),
                        format!("无法解析为整数: {}", raw),
                    );
                    None
                }
            },
        }
    }
}

// ==========================================
// 各实体行映射
// ==========================================
// 返回 None 表示该行校验失败,只出现在问题清单中

pub fn map_sku(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<SkuRecord> {
    let sku_code = reader.required_string(row, "SKU", issues);
    let units_per_carton = reader.required_integer(row, "Units_Per_Carton", issues);
    let carton_weight_kg = reader.required_decimal(row, "Carton_Weight_KG", issues);

    Some(SkuRecord {
        sku_code: sku_code?,
        description: reader.string(row, "Description"),
        asin: reader.string(row, "ASIN"),
        pack_size: reader.integer(row, "Pack_Size", issues),
        material: reader.string(row, "Material"),
        unit_dimensions_cm: reader.string(row, "Unit_Dimensions_cm"),
        unit_weight_kg: reader.decimal(row, "Unit_Weight_KG", issues),
        units_per_carton: units_per_carton?,
        carton_dimensions_cm: reader.string(row, "Carton_Dimensions_cm"),
        carton_weight_kg: carton_weight_kg?,
        packaging_type: reader.string(row, "Packaging_Type"),
        notes: reader.string(row, "Notes"),
        row_number: row.row_number,
    })
}

pub fn map_warehouse_config(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<WarehouseConfigRecord> {
    let warehouse = reader.required_string(row, "Warehouse", issues);
    let sku_code = reader.required_string(row, "SKU", issues);
    let storage = reader.required_integer(row, "Storage_Cartons_Per_Pallet", issues);
    let shipping = reader.required_integer(row, "Shipping_Cartons_Per_Pallet", issues);

    Some(WarehouseConfigRecord {
        warehouse: warehouse?,
        sku_code: sku_code?,
        storage_cartons_per_pallet: storage?,
        shipping_cartons_per_pallet: shipping?,
        effective_date: reader.date(row, "Effective_Date", issues),
        row_number: row.row_number,
    })
}

pub fn map_cost_rate(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<CostRateRecord> {
    let warehouse = reader.required_string(row, "warehouse", issues);
    // 类别为必填: 缺失记 ERROR,非法值回落
    let cost_category = match reader.cost_category_lenient(row, "cost_category", issues) {
        Some(c) => Some(c),
        None => {
            reader.push_issue(
                issues,
                IssueSeverity::Error,
                row,
                "cost_category",
                None,
                "必填字段缺失".to_string(),
            );
            None
        }
    };
    let cost_name = reader.required_string(row, "cost_name", issues);
    let cost_value = reader.required_decimal(row, "cost_value", issues);
    let unit_of_measure = reader.required_string(row, "unit_of_measure", issues);

    Some(CostRateRecord {
        warehouse: warehouse?,
        cost_category: cost_category?,
        cost_name: cost_name?,
        cost_value: cost_value?,
        unit_of_measure: unit_of_measure?,
        effective_date: reader.date(row, "effective_date", issues),
        row_number: row.row_number,
    })
}

pub fn map_ledger_entry(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<InventoryLedgerEntry> {
    let transaction_date = reader.required_date(row, "Transaction_Date", issues);
    let warehouse = reader.required_string(row, "Warehouse", issues);
    let sku_code = reader.required_string(row, "SKU", issues);
    let transaction_type = reader.required_transaction_type(row, "Transaction_Type", issues);
    let cartons_in = reader.cartons(row, "Cartons_In", issues);
    let cartons_out = reader.cartons(row, "Cartons_Out", issues);

    Some(InventoryLedgerEntry {
        transaction_id: reader.string(row, "Transaction_ID"),
        transaction_date: transaction_date?,
        warehouse: warehouse?,
        sku_code: sku_code?,
        batch_lot: reader
            .string(row, "Batch_Lot")
            .unwrap_or_else(|| DEFAULT_BATCH_LOT.to_string()),
        transaction_type: transaction_type?,
        reference_id: reader.string(row, "Reference_ID"),
        cartons_in: cartons_in?,
        cartons_out: cartons_out?,
        storage_pallets_in: reader.integer(row, "Storage_Pallets_In", issues),
        shipping_pallets_out: reader.integer(row, "Shipping_Pallets_Out", issues),
        notes: reader.string(row, "Notes"),
        row_number: row.row_number,
    })
}

pub fn map_balance(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<InventoryBalanceRecord> {
    let warehouse = reader.required_string(row, "Warehouse", issues);
    let sku_code = reader.required_string(row, "SKU", issues);
    let current_cartons = reader.required_integer(row, "Current_Cartons", issues);

    Some(InventoryBalanceRecord {
        warehouse: warehouse?,
        sku_code: sku_code?,
        batch_lot: reader
            .string(row, "Batch_Lot")
            .unwrap_or_else(|| DEFAULT_BATCH_LOT.to_string()),
        current_cartons: current_cartons?,
        current_pallets: reader.integer(row, "Current_Pallets", issues),
        current_units: reader.integer(row, "Current_Units", issues),
        row_number: row.row_number,
    })
}

pub fn map_storage_ledger(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<StorageLedgerEntry> {
    let week_ending_date = reader.required_date(row, "Week_Ending_Date", issues);
    let warehouse = reader.required_string(row, "Warehouse", issues);
    let sku_code = reader.required_string(row, "SKU", issues);
    let cartons = reader.required_integer(row, "Cartons_End_Of_Monday", issues);
    let pallets = reader.required_integer(row, "Storage_Pallets_Charged", issues);
    let rate = reader.required_decimal(row, "Applicable_Weekly_Rate", issues);
    let cost = reader.required_decimal(row, "Calculated_Weekly_Cost", issues);

    Some(StorageLedgerEntry {
        week_ending_date: week_ending_date?,
        warehouse: warehouse?,
        sku_code: sku_code?,
        batch_lot: reader
            .string(row, "Batch_Lot")
            .unwrap_or_else(|| DEFAULT_BATCH_LOT.to_string()),
        cartons_end_of_monday: cartons?,
        storage_pallets_charged: pallets?,
        applicable_weekly_rate: rate?,
        calculated_weekly_cost: cost?,
        billing_period_start: reader.date(row, "Billing_Period_Start", issues),
        billing_period_end: reader.date(row, "Billing_Period_End", issues),
        row_number: row.row_number,
    })
}

pub fn map_calculated_cost(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<CalculatedCostLedgerRecord> {
    let warehouse = reader.required_string(row, "Warehouse", issues);
    let cost_category = match reader.cost_category_lenient(row, "Cost_Category", issues) {
        Some(c) => Some(c),
        None => {
            reader.push_issue(
                issues,
                IssueSeverity::Error,
                row,
                "Cost_Category",
                None,
                "必填字段缺失".to_string(),
            );
            None
        }
    };
    let cost_name = reader.required_string(row, "Cost_Name", issues);
    let quantity = reader.required_decimal(row, "Quantity", issues);
    let rate = reader.required_decimal(row, "Rate", issues);
    let amount = reader.required_decimal(row, "Amount", issues);

    Some(CalculatedCostLedgerRecord {
        warehouse: warehouse?,
        sku_code: reader.string(row, "SKU"),
        cost_category: cost_category?,
        cost_name: cost_name?,
        quantity: quantity?,
        rate: rate?,
        amount: amount?,
        billing_period_start: reader.date(row, "Billing_Period_Start", issues),
        billing_period_end: reader.date(row, "Billing_Period_End", issues),
        notes: reader.string(row, "Notes"),
        row_number: row.row_number,
    })
}

pub fn map_invoice_input(
    reader: &RowReader<'_>,
    row: &RawRow,
    issues: &mut Vec<ValidationIssue>,
) -> Option<InvoiceInputRecord> {
    let invoice_number = reader.required_string(row, "Invoice_Number", issues);
    let warehouse = reader.required_string(row, "Warehouse", issues);
    let period_start = reader.required_date(row, "Billing_Period_Start", issues);
    let period_end = reader.required_date(row, "Billing_Period_End", issues);
    let invoiced_amount = reader.required_decimal(row, "Invoiced_Amount", issues);

    Some(InvoiceInputRecord {
        invoice_number: invoice_number?,
        warehouse: warehouse?,
        billing_period_start: period_start?,
        billing_period_end: period_end?,
        invoice_received_date: reader.date(row, "Invoice_Received_Date", issues),
        cost_category: reader.cost_category_lenient(row, "Cost_Category", issues),
        cost_name: reader.string(row, "Cost_Name"),
        invoiced_quantity: reader.decimal(row, "Invoiced_Quantity", issues),
        invoiced_amount: invoiced_amount?,
        notes: reader.string(row, "Notes"),
        row_number: row.row_number,
    })
}
