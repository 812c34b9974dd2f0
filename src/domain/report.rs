// ==========================================
// 仓储管理数据导入系统 - 校验问题与导入报告
// ==========================================
// 职责: 定义问题清单与报告结构
// 红线: 问题只累积,不在中途打断导入
// ==========================================

use crate::domain::records::{ComputedBalance, EntityCollections};
use crate::domain::types::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// IssueSeverity - 问题级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,    // 提示（仅记录）
    Warning, // 警告（允许导入）
    Error,   // 错误（该行/该实体不可用）
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Info => write!(f, "INFO"),
            IssueSeverity::Warning => write!(f, "WARNING"),
            IssueSeverity::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// IssueKind - 问题类别
// ==========================================
// 对应错误分类: 模式不匹配 / 行校验 / 引用完整性 / 余额不变式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    UnknownSheet,         // 未识别的工作表
    SchemaMismatch,       // 必需工作表/列缺失
    RowValidation,        // 行级类型/必填校验失败
    DuplicateKey,         // 主键重复（首次出现生效）
    ReferentialIntegrity, // 引用完整性（悬空 SKU/仓库配置）
    BalanceInvariant,     // 运行余额为负
    BalanceMismatch,      // 表内余额与重放结果不一致
    CostMismatch,         // 周费用与托盘×费率不一致
    BillingPeriod,        // 账期不满足 16 日至次月 15 日
    CategoryFallback,     // 费用类别回落到 Accessorial
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::UnknownSheet => "UNKNOWN_SHEET",
            IssueKind::SchemaMismatch => "SCHEMA_MISMATCH",
            IssueKind::RowValidation => "ROW_VALIDATION",
            IssueKind::DuplicateKey => "DUPLICATE_KEY",
            IssueKind::ReferentialIntegrity => "REFERENTIAL_INTEGRITY",
            IssueKind::BalanceInvariant => "BALANCE_INVARIANT",
            IssueKind::BalanceMismatch => "BALANCE_MISMATCH",
            IssueKind::CostMismatch => "COST_MISMATCH",
            IssueKind::BillingPeriod => "BILLING_PERIOD",
            IssueKind::CategoryFallback => "CATEGORY_FALLBACK",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// ValidationIssue - 校验问题记录
// ==========================================
// 坐标始终指向原始工作表（表名 + 行号 + 列名 + 原始值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,       // 问题级别
    pub kind: IssueKind,               // 问题类别
    pub sheet: String,                 // 工作表名（原始）
    pub row_number: Option<usize>,     // 原始行号（表级问题为 None）
    pub column: Option<String>,        // 列名
    pub raw_value: Option<String>,     // 原始单元格值
    pub message: String,               // 问题描述
}

impl ValidationIssue {
    /// 表级问题（无行坐标）
    pub fn sheet_level(
        severity: IssueSeverity,
        kind: IssueKind,
        sheet: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            sheet: sheet.into(),
            row_number: None,
            column: None,
            raw_value: None,
            message: message.into(),
        }
    }

    /// 行级问题
    pub fn row_level(
        severity: IssueSeverity,
        kind: IssueKind,
        sheet: impl Into<String>,
        row_number: usize,
        column: Option<String>,
        raw_value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            sheet: sheet.into(),
            row_number: Some(row_number),
            column,
            raw_value,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}] {}", self.severity, self.kind, self.sheet)?;
        if let Some(row) = self.row_number {
            write!(f, " 行 {}", row)?;
        }
        if let Some(col) = &self.column {
            write!(f, " 列 {}", col)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(raw) = &self.raw_value {
            write!(f, " (原始值: {})", raw)?;
        }
        Ok(())
    }
}

// ==========================================
// IssueSummary - 问题汇总统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub info: usize,    // 提示数
    pub warning: usize, // 警告数
    pub error: usize,   // 错误数
}

impl IssueSummary {
    pub fn tally(issues: &[ValidationIssue]) -> Self {
        let mut summary = IssueSummary::default();
        for issue in issues {
            match issue.severity {
                IssueSeverity::Info => summary.info += 1,
                IssueSeverity::Warning => summary.warning += 1,
                IssueSeverity::Error => summary.error += 1,
            }
        }
        summary
    }
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
// 完整问题清单在导入结束时一次性输出,不与部分结果交错
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,                      // 批次 ID（UUID）
    pub source: String,                        // 源文件路径
    pub started_at: DateTime<Utc>,             // 开始时间
    pub entity_counts: Vec<(EntityKind, usize)>, // 各实体记录数
    pub summary: IssueSummary,                 // 汇总统计
    pub issues: Vec<ValidationIssue>,          // 问题明细（有序）
}

impl ImportReport {
    /// 是否存在实体级/行级错误（决定 CLI 退出码）
    pub fn has_errors(&self) -> bool {
        self.summary.error > 0
    }
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
// 导入接口返回值: 已校验记录集 + 重放余额 + 报告
// 部分结果永远保留,是否接受部分导入由调用方决定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub entities: EntityCollections,           // 各实体已校验记录
    pub balances: Vec<ComputedBalance>,        // 重放得到的余额
    pub report: ImportReport,                  // 导入报告
}
