// ==========================================
// 仓储管理数据导入系统 - 实体记录模型
// ==========================================
// 职责: 定义各工作表对应的已校验记录类型
// 用途: 导入层写入,下游持久化只读
// ==========================================

use crate::domain::types::{CostCategory, TransactionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SkuRecord - SKU 主数据
// ==========================================
// 主键: sku_code（同批次内唯一,重复行首次出现生效）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuRecord {
    // ===== 主键 =====
    pub sku_code: String,                      // SKU 编码

    // ===== 基础信息 =====
    pub description: Option<String>,           // 商品描述
    pub asin: Option<String>,                  // 平台商品编号
    pub pack_size: Option<i64>,                // 内包装数
    pub material: Option<String>,              // 材质

    // ===== 包装维度 =====
    pub unit_dimensions_cm: Option<String>,    // 单件尺寸（cm）
    pub unit_weight_kg: Option<f64>,           // 单件重量（kg）
    pub units_per_carton: i64,                 // 每箱件数
    pub carton_dimensions_cm: Option<String>,  // 整箱尺寸（cm）
    pub carton_weight_kg: f64,                 // 整箱重量（kg）
    pub packaging_type: Option<String>,        // 包装类型

    // ===== 备注 =====
    pub notes: Option<String>,                 // 备注

    // ===== 元信息 =====
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// WarehouseConfigRecord - 仓库-SKU 托盘配置
// ==========================================
// 复合键: (warehouse, sku_code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfigRecord {
    pub warehouse: String,                     // 仓库代码
    pub sku_code: String,                      // SKU 编码
    pub storage_cartons_per_pallet: i64,       // 存储口径每托盘箱数
    pub shipping_cartons_per_pallet: i64,      // 发运口径每托盘箱数
    pub effective_date: Option<NaiveDate>,     // 生效日期
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// CostRateRecord - 费率主数据
// ==========================================
// 费率表,可能带生效日期区间（区间终点不建模）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRateRecord {
    pub warehouse: String,                     // 仓库代码
    pub cost_category: CostCategory,           // 费用类别
    pub cost_name: String,                     // 费用名称
    pub cost_value: f64,                       // 费用单价
    pub unit_of_measure: String,               // 计价单位
    pub effective_date: Option<NaiveDate>,     // 生效日期
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// InventoryLedgerEntry - 库存流水账条目
// ==========================================
// 只追加事件日志,顺序对余额重放有意义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLedgerEntry {
    pub transaction_id: Option<String>,        // 交易编号
    pub transaction_date: NaiveDate,           // 交易日期
    pub warehouse: String,                     // 仓库代码
    pub sku_code: String,                      // SKU 编码
    pub batch_lot: String,                     // 批次号（缺省 DEFAULT）
    pub transaction_type: TransactionType,     // 交易类型
    pub reference_id: Option<String>,          // 关联单据（船名/柜号/发运号）
    pub cartons_in: i64,                       // 入库箱数
    pub cartons_out: i64,                      // 出库箱数
    pub storage_pallets_in: Option<i64>,       // 入库托盘数（存储口径）
    pub shipping_pallets_out: Option<i64>,     // 出库托盘数（发运口径）
    pub notes: Option<String>,                 // 备注
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// InventoryBalanceRecord - 库存余额（表内申报值）
// ==========================================
// 来自 inventory balance 工作表,与重放结果交叉核对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryBalanceRecord {
    pub warehouse: String,                     // 仓库代码
    pub sku_code: String,                      // SKU 编码
    pub batch_lot: String,                     // 批次号
    pub current_cartons: i64,                  // 当前箱数
    pub current_pallets: Option<i64>,          // 当前托盘数
    pub current_units: Option<i64>,            // 当前件数
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// ComputedBalance - 重放得到的库存余额
// ==========================================
// 由流水账按 (交易日期, 行号) 顺序重放得出
// 不变式: 运行余额任一时点不得为负
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedBalance {
    pub warehouse: String,                     // 仓库代码
    pub sku_code: String,                      // SKU 编码
    pub batch_lot: String,                     // 批次号
    pub current_cartons: i64,                  // 最终箱数（违规时截断为 0）
    pub is_valid: bool,                        // 重放过程是否未出现负余额
}

// ==========================================
// StorageLedgerEntry - 仓储费周快照
// ==========================================
// 每周一生成; 账期为上月 16 日至本月 15 日
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLedgerEntry {
    pub week_ending_date: NaiveDate,           // 周截止日（必须为周一）
    pub warehouse: String,                     // 仓库代码
    pub sku_code: String,                      // SKU 编码
    pub batch_lot: String,                     // 批次号
    pub cartons_end_of_monday: i64,            // 周一终点箱数
    pub storage_pallets_charged: i64,          // 计费托盘数
    pub applicable_weekly_rate: f64,           // 适用周费率
    pub calculated_weekly_cost: f64,           // 计算周费用
    pub billing_period_start: Option<NaiveDate>, // 账期起（16 日）
    pub billing_period_end: Option<NaiveDate>,   // 账期止（次月 15 日）
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// CalculatedCostLedgerRecord - 计算费用账
// ==========================================
// 源工作表当前为空,仅保留模式定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedCostLedgerRecord {
    pub warehouse: String,                     // 仓库代码
    pub sku_code: Option<String>,              // SKU 编码
    pub cost_category: CostCategory,           // 费用类别
    pub cost_name: String,                     // 费用名称
    pub quantity: f64,                         // 数量
    pub rate: f64,                             // 单价
    pub amount: f64,                           // 金额
    pub billing_period_start: Option<NaiveDate>, // 账期起
    pub billing_period_end: Option<NaiveDate>,   // 账期止
    pub notes: Option<String>,                 // 备注
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// InvoiceInputRecord - 发票录入行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceInputRecord {
    pub invoice_number: String,                // 发票号
    pub warehouse: String,                     // 仓库代码
    pub billing_period_start: NaiveDate,       // 账期起（16 日）
    pub billing_period_end: NaiveDate,         // 账期止（次月 15 日）
    pub invoice_received_date: Option<NaiveDate>, // 收票日期
    pub cost_category: Option<CostCategory>,   // 费用类别
    pub cost_name: Option<String>,             // 费用名称
    pub invoiced_quantity: Option<f64>,        // 开票数量
    pub invoiced_amount: f64,                  // 开票金额
    pub notes: Option<String>,                 // 备注
    pub row_number: usize,                     // 原始工作表行号
}

// ==========================================
// EntityCollections - 各实体已校验记录集
// ==========================================
// 每行要么进入这里,要么以原始坐标出现在问题清单中
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityCollections {
    pub skus: Vec<SkuRecord>,
    pub warehouse_configs: Vec<WarehouseConfigRecord>,
    pub cost_rates: Vec<CostRateRecord>,
    pub inventory_ledger: Vec<InventoryLedgerEntry>,
    pub inventory_balances: Vec<InventoryBalanceRecord>,
    pub storage_ledger: Vec<StorageLedgerEntry>,
    pub calculated_costs: Vec<CalculatedCostLedgerRecord>,
    pub invoice_inputs: Vec<InvoiceInputRecord>,
}

impl EntityCollections {
    /// 按实体统计记录数（汇总展示用）
    pub fn counts(&self) -> Vec<(crate::domain::types::EntityKind, usize)> {
        use crate::domain::types::EntityKind;
        vec![
            (EntityKind::SkuMaster, self.skus.len()),
            (EntityKind::WarehouseConfig, self.warehouse_configs.len()),
            (EntityKind::CostMaster, self.cost_rates.len()),
            (EntityKind::InventoryLedger, self.inventory_ledger.len()),
            (EntityKind::InventoryBalance, self.inventory_balances.len()),
            (EntityKind::StorageLedger, self.storage_ledger.len()),
            (EntityKind::CalculatedCostsLedger, self.calculated_costs.len()),
            (EntityKind::InvoiceInput, self.invoice_inputs.len()),
        ]
    }
}
