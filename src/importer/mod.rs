// ==========================================
// 仓储管理数据导入系统 - 导入层
// ==========================================
// 职责: 工作簿读取,模式映射,生成已校验记录集
// 支持: Excel (.xlsx/.xls), CSV (.csv)
// ==========================================

// 模块声明
pub mod balance_replayer;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod loader;
pub mod loader_trait;
pub mod ref_checker;
pub mod schema;

// 重导出核心类型
pub use balance_replayer::BalanceReplayer;
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{RowReader, DEFAULT_BATCH_LOT};
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawSheet, RawWorkbook, UniversalFileParser};
pub use loader::WorkbookLoaderImpl;
pub use ref_checker::RefChecker;
pub use schema::{ColumnSpec, EntitySchema, SchemaRegistry};

// 重导出 Trait 接口
pub use loader_trait::{FileParser, WorkbookLoader};
