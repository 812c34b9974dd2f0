// ==========================================
// 仓储管理数据导入系统 - 领域模型层
// ==========================================
// 职责: 定义实体记录、类型、问题与报告结构
// 红线: 不含文件解析逻辑,不含校验流程
// ==========================================

pub mod records;
pub mod report;
pub mod types;

// 重导出核心类型
pub use records::{
    CalculatedCostLedgerRecord, ComputedBalance, CostRateRecord, EntityCollections,
    InventoryBalanceRecord, InventoryLedgerEntry, InvoiceInputRecord, SkuRecord,
    StorageLedgerEntry, WarehouseConfigRecord,
};
pub use report::{
    ImportOutcome, ImportReport, IssueKind, IssueSeverity, IssueSummary, ValidationIssue,
};
pub use types::{ColumnType, CostCategory, EntityKind, TransactionType};
