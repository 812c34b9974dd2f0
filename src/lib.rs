// ==========================================
// 仓储管理数据导入系统 - 核心库
// ==========================================
// 技术栈: Rust + calamine/csv
// 系统定位: 批处理导入（单线程同步,一次跑完整个工作簿）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 工作簿读取与模式映射
pub mod importer;

// 配置层 - 加载器选项
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ColumnType, CostCategory, EntityKind, TransactionType};

// 领域实体
pub use domain::{
    CalculatedCostLedgerRecord, ComputedBalance, CostRateRecord, EntityCollections,
    ImportOutcome, ImportReport, InventoryBalanceRecord, InventoryLedgerEntry,
    InvoiceInputRecord, IssueKind, IssueSeverity, IssueSummary, SkuRecord, StorageLedgerEntry,
    ValidationIssue, WarehouseConfigRecord,
};

// 导入层
pub use importer::{
    CsvParser, ExcelParser, FileParser, ImportError, ImportResult, RawRow, RawSheet, RawWorkbook,
    SchemaRegistry, UniversalFileParser, WorkbookLoader, WorkbookLoaderImpl,
};

// 配置
pub use config::LoaderOptions;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓储管理数据导入系统";
