// ==========================================
// 仓储管理数据导入系统 - 领域类型定义
// ==========================================
// 职责: 定义跨模块共享的枚举类型
// 红线: 不含解析逻辑之外的业务规则
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 逻辑实体 (Entity Kind)
// ==========================================
// 每个枚举值对应工作簿中一张固定命名的工作表
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    SkuMaster,             // SKU 主数据
    WarehouseConfig,       // 仓库-SKU 托盘配置
    CostMaster,            // 费率主数据
    InventoryLedger,       // 库存流水账（只追加事件日志）
    InventoryBalance,      // 库存余额（物化快照）
    StorageLedger,         // 仓储费周快照
    Helper,                // 辅助工作表（仅识别,不校验）
    CalculatedCostsLedger, // 计算费用账（账期记录）
    InvoiceInput,          // 发票录入
}

impl EntityKind {
    /// 工作表逻辑名（匹配时忽略大小写与空白）
    pub fn sheet_name(&self) -> &'static str {
        match self {
            EntityKind::SkuMaster => "sku master",
            EntityKind::WarehouseConfig => "warehouse config",
            EntityKind::CostMaster => "cost master",
            EntityKind::InventoryLedger => "inventory ledger",
            EntityKind::InventoryBalance => "inventory balance",
            EntityKind::StorageLedger => "storage ledger",
            EntityKind::Helper => "helper",
            EntityKind::CalculatedCostsLedger => "calculated costs ledger",
            EntityKind::InvoiceInput => "invoice input",
        }
    }

    /// 全部实体（注册表声明顺序,决定匹配优先级与输出顺序）
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::SkuMaster,
            EntityKind::WarehouseConfig,
            EntityKind::CostMaster,
            EntityKind::InventoryLedger,
            EntityKind::InventoryBalance,
            EntityKind::StorageLedger,
            EntityKind::Helper,
            EntityKind::CalculatedCostsLedger,
            EntityKind::InvoiceInput,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sheet_name())
    }
}

// ==========================================
// 交易类型 (Transaction Type)
// ==========================================
// 库存流水账的三种事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Receive, // 入库
    Ship,    // 出库
    Adjust,  // 调整
}

impl TransactionType {
    /// 解析原始单元格值（大小写不敏感）
    ///
    /// # 返回
    /// - Some(TransactionType): 合法值
    /// - None: 非法值（由调用方记录 RowValidation 错误）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "RECEIVE" => Some(TransactionType::Receive),
            "SHIP" => Some(TransactionType::Ship),
            "ADJUST" => Some(TransactionType::Adjust),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Receive => write!(f, "RECEIVE"),
            TransactionType::Ship => write!(f, "SHIP"),
            TransactionType::Adjust => write!(f, "ADJUST"),
        }
    }
}

// ==========================================
// 费用类别 (Cost Category)
// ==========================================
// 未知类别回落到 Accessorial（与源数据口径一致,回落时记 INFO）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostCategory {
    Container,   // 整柜
    Carton,      // 按箱
    Pallet,      // 按托盘
    Storage,     // 仓储
    Unit,        // 按件
    Shipment,    // 按发运
    Accessorial, // 杂费
}

impl CostCategory {
    /// 解析原始单元格值（大小写不敏感）
    ///
    /// # 返回
    /// - (类别, 是否为回落值)
    pub fn parse_lenient(raw: &str) -> (Self, bool) {
        match raw.trim().to_lowercase().as_str() {
            "container" => (CostCategory::Container, false),
            "carton" => (CostCategory::Carton, false),
            "pallet" => (CostCategory::Pallet, false),
            "storage" => (CostCategory::Storage, false),
            "unit" => (CostCategory::Unit, false),
            "shipment" => (CostCategory::Shipment, false),
            "accessorial" => (CostCategory::Accessorial, false),
            _ => (CostCategory::Accessorial, true),
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCategory::Container => write!(f, "Container"),
            CostCategory::Carton => write!(f, "Carton"),
            CostCategory::Pallet => write!(f, "Pallet"),
            CostCategory::Storage => write!(f, "Storage"),
            CostCategory::Unit => write!(f, "Unit"),
            CostCategory::Shipment => write!(f, "Shipment"),
            CostCategory::Accessorial => write!(f, "Accessorial"),
        }
    }
}

// ==========================================
// 列类型 (Column Type)
// ==========================================
// 模式注册表声明的原始类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    String,          // 文本
    Integer,         // 整数
    Decimal,         // 小数
    Date,            // 日期
    TransactionType, // 交易类型枚举
    CostCategory,    // 费用类别枚举
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "STRING"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Decimal => write!(f, "DECIMAL"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::TransactionType => write!(f, "TRANSACTION_TYPE"),
            ColumnType::CostCategory => write!(f, "COST_CATEGORY"),
        }
    }
}
