// ==========================================
// 仓储管理数据导入系统 - 静态模式注册表
// ==========================================
// 职责: 实体 → 工作表名 → 列规格（名称/别名/类型/必填）
// 说明: 取代源系统的运行时类型推断,
//       所有类型与必填约束在此显式声明
// ==========================================

use crate::domain::types::{ColumnType, EntityKind};
use std::collections::HashMap;

// ==========================================
// ColumnSpec - 列规格
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,             // 标准列名
    pub aliases: &'static [&'static str], // 列名别名（历史表头兼容）
    pub column_type: ColumnType,        // 声明类型
    pub required: bool,                 // 是否必填
}

const fn col(name: &'static str, column_type: ColumnType, required: bool) -> ColumnSpec {
    ColumnSpec {
        name,
        aliases: &[],
        column_type,
        required,
    }
}

const fn col_aliased(
    name: &'static str,
    aliases: &'static [&'static str],
    column_type: ColumnType,
    required: bool,
) -> ColumnSpec {
    ColumnSpec {
        name,
        aliases,
        column_type,
        required,
    }
}

// ==========================================
// EntitySchema - 实体模式
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub kind: EntityKind,               // 逻辑实体
    pub sheet_required: bool,           // 工作表缺失是否记缺表问题
    pub skip_validation: bool,          // 仅识别,不校验（helper）
    pub columns: &'static [ColumnSpec], // 列规格
}

impl EntitySchema {
    /// 在表头中解析各规格列的实际列名（大小写不敏感,别名兼容）
    ///
    /// # 返回
    /// - resolved: 标准列名 → 实际表头
    /// - missing: 缺失的必填列（标准列名）
    pub fn resolve_columns(
        &self,
        headers: &[String],
    ) -> (HashMap<&'static str, String>, Vec<&'static str>) {
        let lowered: Vec<(String, &String)> =
            headers.iter().map(|h| (h.to_lowercase(), h)).collect();

        let mut resolved = HashMap::new();
        let mut missing = Vec::new();

        for spec in self.columns {
            let mut found = None;
            for candidate in std::iter::once(&spec.name).chain(spec.aliases.iter()) {
                let wanted = candidate.to_lowercase();
                if let Some((_, actual)) = lowered.iter().find(|(low, _)| *low == wanted) {
                    found = Some((*actual).clone());
                    break;
                }
            }

            match found {
                Some(actual) => {
                    resolved.insert(spec.name, actual);
                }
                None if spec.required => missing.push(spec.name),
                None => {}
            }
        }

        (resolved, missing)
    }
}

// ==========================================
// 各实体列规格（列名来自源工作簿表头）
// ==========================================

const SKU_MASTER_COLUMNS: &[ColumnSpec] = &[
    col("SKU", ColumnType::String, true),
    col_aliased(
        "Units_Per_Carton",
        &["Units_per_Carton"],
        ColumnType::Integer,
        true,
    ),
    col_aliased(
        "Carton_Weight_KG",
        &["Carton_Weight_kg"],
        ColumnType::Decimal,
        true,
    ),
    col("Description", ColumnType::String, false),
    col("ASIN", ColumnType::String, false),
    col("Pack_Size", ColumnType::Integer, false),
    col("Material", ColumnType::String, false),
    col("Unit_Dimensions_cm", ColumnType::String, false),
    col_aliased(
        "Unit_Weight_KG",
        &["Unit_Weight_kg"],
        ColumnType::Decimal,
        false,
    ),
    col("Carton_Dimensions_cm", ColumnType::String, false),
    col("Packaging_Type", ColumnType::String, false),
    col("Notes", ColumnType::String, false),
];

const WAREHOUSE_CONFIG_COLUMNS: &[ColumnSpec] = &[
    col("Warehouse", ColumnType::String, true),
    col("SKU", ColumnType::String, true),
    // 历史表头只有单一 Cartons_per_pallet,存储/发运两个口径共用
    col_aliased(
        "Storage_Cartons_Per_Pallet",
        &["Cartons_Per_Pallet", "Cartons_per_pallet"],
        ColumnType::Integer,
        true,
    ),
    col_aliased(
        "Shipping_Cartons_Per_Pallet",
        &["Cartons_Per_Pallet", "Cartons_per_pallet"],
        ColumnType::Integer,
        true,
    ),
    col("Effective_Date", ColumnType::Date, false),
];

const COST_MASTER_COLUMNS: &[ColumnSpec] = &[
    col("warehouse", ColumnType::String, true),
    col("cost_category", ColumnType::CostCategory, true),
    col("cost_name", ColumnType::String, true),
    col("cost_value", ColumnType::Decimal, true),
    col("unit_of_measure", ColumnType::String, true),
    col("effective_date", ColumnType::Date, false),
];

const INVENTORY_LEDGER_COLUMNS: &[ColumnSpec] = &[
    col("Transaction_ID", ColumnType::String, false),
    col("Transaction_Date", ColumnType::Date, true),
    col("Warehouse", ColumnType::String, true),
    col("SKU", ColumnType::String, true),
    col("Batch_Lot", ColumnType::String, false),
    col("Transaction_Type", ColumnType::TransactionType, true),
    col("Reference_ID", ColumnType::String, false),
    col("Cartons_In", ColumnType::Integer, false),
    col("Cartons_Out", ColumnType::Integer, false),
    col("Storage_Pallets_In", ColumnType::Integer, false),
    col("Shipping_Pallets_Out", ColumnType::Integer, false),
    col("Notes", ColumnType::String, false),
];

const INVENTORY_BALANCE_COLUMNS: &[ColumnSpec] = &[
    col("Warehouse", ColumnType::String, true),
    col("SKU", ColumnType::String, true),
    col("Batch_Lot", ColumnType::String, false),
    col("Current_Cartons", ColumnType::Integer, true),
    col("Current_Pallets", ColumnType::Integer, false),
    col("Current_Units", ColumnType::Integer, false),
];

const STORAGE_LEDGER_COLUMNS: &[ColumnSpec] = &[
    col("Week_Ending_Date", ColumnType::Date, true),
    col("Warehouse", ColumnType::String, true),
    col("SKU", ColumnType::String, true),
    col("Batch_Lot", ColumnType::String, false),
    col("Cartons_End_Of_Monday", ColumnType::Integer, true),
    col("Storage_Pallets_Charged", ColumnType::Integer, true),
    col("Applicable_Weekly_Rate", ColumnType::Decimal, true),
    col("Calculated_Weekly_Cost", ColumnType::Decimal, true),
    col("Billing_Period_Start", ColumnType::Date, false),
    col("Billing_Period_End", ColumnType::Date, false),
];

const CALCULATED_COSTS_COLUMNS: &[ColumnSpec] = &[
    col("Warehouse", ColumnType::String, true),
    col("Cost_Category", ColumnType::CostCategory, true),
    col("Cost_Name", ColumnType::String, true),
    col("Quantity", ColumnType::Decimal, true),
    col("Rate", ColumnType::Decimal, true),
    col("Amount", ColumnType::Decimal, true),
    col("SKU", ColumnType::String, false),
    col("Billing_Period_Start", ColumnType::Date, false),
    col("Billing_Period_End", ColumnType::Date, false),
    col("Notes", ColumnType::String, false),
];

const INVOICE_INPUT_COLUMNS: &[ColumnSpec] = &[
    col("Invoice_Number", ColumnType::String, true),
    col("Warehouse", ColumnType::String, true),
    col("Billing_Period_Start", ColumnType::Date, true),
    col("Billing_Period_End", ColumnType::Date, true),
    col("Invoiced_Amount", ColumnType::Decimal, true),
    col("Cost_Category", ColumnType::CostCategory, false),
    col("Cost_Name", ColumnType::String, false),
    col("Invoiced_Quantity", ColumnType::Decimal, false),
    col("Invoice_Received_Date", ColumnType::Date, false),
    col("Notes", ColumnType::String, false),
];

const REGISTRY: &[EntitySchema] = &[
    EntitySchema {
        kind: EntityKind::SkuMaster,
        sheet_required: true,
        skip_validation: false,
        columns: SKU_MASTER_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::WarehouseConfig,
        sheet_required: true,
        skip_validation: false,
        columns: WAREHOUSE_CONFIG_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::CostMaster,
        sheet_required: true,
        skip_validation: false,
        columns: COST_MASTER_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::InventoryLedger,
        sheet_required: true,
        skip_validation: false,
        columns: INVENTORY_LEDGER_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::InventoryBalance,
        sheet_required: false,
        skip_validation: false,
        columns: INVENTORY_BALANCE_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::StorageLedger,
        sheet_required: false,
        skip_validation: false,
        columns: STORAGE_LEDGER_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::Helper,
        sheet_required: false,
        skip_validation: true,
        columns: &[],
    },
    EntitySchema {
        kind: EntityKind::CalculatedCostsLedger,
        sheet_required: false,
        skip_validation: false,
        columns: CALCULATED_COSTS_COLUMNS,
    },
    EntitySchema {
        kind: EntityKind::InvoiceInput,
        sheet_required: false,
        skip_validation: false,
        columns: INVOICE_INPUT_COLUMNS,
    },
];

// ==========================================
// SchemaRegistry - 模式注册表
// ==========================================
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// 注册表条目（声明顺序即匹配优先级与输出顺序）
    pub fn entries() -> &'static [EntitySchema] {
        REGISTRY
    }

    /// 按实体取模式
    pub fn schema_for(kind: EntityKind) -> &'static EntitySchema {
        REGISTRY
            .iter()
            .find(|s| s.kind == kind)
            .expect("registry covers all entity kinds")
    }

    /// 工作表名标准化: 小写 + 压缩空白
    pub fn normalize_sheet_name(name: &str) -> String {
        name.to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 工作表名 → 实体（按声明顺序,第一个标准化相等者生效）
    pub fn match_sheet(name: &str) -> Option<EntityKind> {
        let normalized = Self::normalize_sheet_name(name);
        REGISTRY
            .iter()
            .find(|s| s.kind.sheet_name() == normalized)
            .map(|s| s.kind)
    }
}
