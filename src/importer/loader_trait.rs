// ==========================================
// 仓储管理数据导入系统 - 导入接口 Trait
// ==========================================
// 职责: 定义导入管道接口（不包含实现）
// 红线: 不含数据持久化接口; 导入为同步批处理,
//       单线程跑完整个工作簿
// ==========================================

use crate::domain::report::ImportOutcome;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawWorkbook;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始工作簿（表名 + 行记录）
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawWorkbook): 原始工作簿（空白行已剔除,物理行号保留）
    /// - Err(ImportError): 文件不存在/格式不支持/解析失败（致命）
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<RawWorkbook>;
}

// ==========================================
// WorkbookLoader Trait
// ==========================================
// 用途: 工作簿加载与模式映射主接口
// 实现者: WorkbookLoaderImpl
pub trait WorkbookLoader {
    /// 从文件加载并校验工作簿
    ///
    /// # 参数
    /// - file_path: 工作簿路径（.xlsx/.xls/.csv）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 已校验记录集 + 重放余额 + 报告
    /// - Err(ImportError): 仅文件不可读等致命错误;
    ///   行级/引用级问题累积在报告中,不走 Err 通道
    ///
    /// # 加载流程
    /// 1. 文件读取与解析
    /// 2. 工作表与实体匹配（大小写/空白不敏感）
    /// 3. 字段映射与类型转换（逐行,出错不中断）
    /// 4. 实体级校验（重复键/周一/账期/费用复核）
    /// 5. 引用完整性交叉校验
    /// 6. 流水账重放生成库存余额
    fn load_from_path(&self, file_path: &Path) -> ImportResult<ImportOutcome>;

    /// 对已解析的工作簿执行阶段 1-6
    ///
    /// 与 load_from_path 的唯一差异是跳过文件读取,
    /// 供测试与内存数据复用
    fn load_raw(&self, workbook: RawWorkbook) -> ImportOutcome;
}
