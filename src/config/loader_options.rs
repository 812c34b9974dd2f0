// ==========================================
// 仓储管理数据导入系统 - 加载器配置
// ==========================================
// 职责: 导入流程可调参数
// 说明: 无持久化配置存储,调用方显式传入;
//       缺省值即源工作簿的常规口径
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// LoaderOptions - 加载器选项
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderOptions {
    /// 未识别工作表是否升级为错误（缺省仅警告）
    pub strict_unknown_sheets: bool,

    /// 金额复核容差（周费用 = 托盘×费率 / 金额 = 数量×单价）
    pub cost_tolerance: f64,

    /// 是否将表内申报余额与流水重放结果交叉核对
    pub cross_check_balances: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            strict_unknown_sheets: false,
            cost_tolerance: 0.01,
            cross_check_balances: true,
        }
    }
}
