// ==========================================
// 仓储管理数据导入系统 - 库存余额重放器实现
// ==========================================
// 职责: 流水账 → 库存余额（阶段 5）
// 规则: 按 (交易日期, 物理行号) 顺序逐笔重放,
//       运行余额任一时点不得为负;
//       违规行记 BalanceInvariant 错误,余额截断为 0 并标记无效
// ==========================================

use crate::domain::records::{ComputedBalance, InventoryBalanceRecord, InventoryLedgerEntry};
use crate::domain::report::{IssueKind, IssueSeverity, ValidationIssue};
use crate::domain::types::EntityKind;
use std::collections::BTreeMap;

pub struct BalanceReplayer;

impl BalanceReplayer {
    /// 重放流水账,生成每个 (仓库, SKU, 批次) 的余额
    ///
    /// # 返回
    /// - Vec<ComputedBalance>: 按键字典序排列（确定性输出）
    pub fn replay(
        entries: &[InventoryLedgerEntry],
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<ComputedBalance> {
        let sheet = EntityKind::InventoryLedger.sheet_name();

        // 分组,BTreeMap 保证输出顺序与输入字节无关
        let mut groups: BTreeMap<(String, String, String), Vec<&InventoryLedgerEntry>> =
            BTreeMap::new();
        for entry in entries {
            groups
                .entry((
                    entry.warehouse.clone(),
                    entry.sku_code.clone(),
                    entry.batch_lot.clone(),
                ))
                .or_default()
                .push(entry);
        }

        let mut balances = Vec::new();
        for ((warehouse, sku_code, batch_lot), mut group) in groups {
            // 时间序重放; 同日按物理行号保持文件顺序
            group.sort_by_key(|e| (e.transaction_date, e.row_number));

            let mut balance: i64 = 0;
            let mut is_valid = true;
            for entry in group {
                balance += entry.cartons_in - entry.cartons_out;
                if balance < 0 {
                    issues.push(ValidationIssue::row_level(
                        IssueSeverity::Error,
                        IssueKind::BalanceInvariant,
                        sheet,
                        entry.row_number,
                        Some("Cartons_Out".to_string()),
                        Some(entry.cartons_out.to_string()),
                        format!(
                            "(仓库 {}, SKU {}, 批次 {}) 运行余额为负: {}",
                            warehouse, sku_code, batch_lot, balance
                        ),
                    ));
                    balance = 0;
                    is_valid = false;
                }
            }

            balances.push(ComputedBalance {
                warehouse,
                sku_code,
                batch_lot,
                current_cartons: balance,
                is_valid,
            });
        }

        balances
    }

    /// 表内申报余额与重放结果交叉核对
    ///
    /// 申报值与重放值不一致（含无对应流水的申报行）记警告
    pub fn cross_check(
        declared: &[InventoryBalanceRecord],
        computed: &[ComputedBalance],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let sheet = EntityKind::InventoryBalance.sheet_name();
        let computed_map: BTreeMap<(&str, &str, &str), &ComputedBalance> = computed
            .iter()
            .map(|b| {
                (
                    (b.warehouse.as_str(), b.sku_code.as_str(), b.batch_lot.as_str()),
                    b,
                )
            })
            .collect();

        for record in declared {
            let key = (
                record.warehouse.as_str(),
                record.sku_code.as_str(),
                record.batch_lot.as_str(),
            );
            let replayed = computed_map.get(&key).map(|b| b.current_cartons).unwrap_or(0);

            if replayed != record.current_cartons {
                issues.push(ValidationIssue::row_level(
                    IssueSeverity::Warning,
                    IssueKind::BalanceMismatch,
                    sheet,
                    record.row_number,
                    Some("Current_Cartons".to_string()),
                    Some(record.current_cartons.to_string()),
                    format!("申报余额与流水重放结果不一致（重放值 {}）", replayed),
                ));
            }
        }
    }
}
