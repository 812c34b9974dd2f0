// ==========================================
// 仓储管理数据导入系统 - 加载器集成测试
// ==========================================
// 覆盖: 工作表匹配 / 字段映射 / 引用完整性 /
//       余额重放 / 账期与周一规则 / 确定性
// ==========================================

mod test_helpers;

use test_helpers::{minimal_workbook, sheet, workbook};
use wms_importer::importer::{WorkbookLoader, WorkbookLoaderImpl};
use wms_importer::{EntityKind, IssueKind, IssueSeverity};

fn loader() -> WorkbookLoaderImpl {
    WorkbookLoaderImpl::with_defaults()
}

// ==========================================
// 余额重放场景
// ==========================================

#[test]
fn test_receive_then_ship_balance() {
    let wb = minimal_workbook(&[
        &["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"],
        &["2024-03-04", "FMC", "A1", "SHIP", "0", "4"],
    ]);

    let outcome = loader().load_raw(wb);

    assert_eq!(outcome.report.summary.error, 0);
    assert_eq!(outcome.entities.inventory_ledger.len(), 2);
    assert_eq!(outcome.balances.len(), 1);
    assert_eq!(outcome.balances[0].sku_code, "A1");
    assert_eq!(outcome.balances[0].current_cartons, 6);
    assert!(outcome.balances[0].is_valid);
}

#[test]
fn test_overship_reports_invariant_and_clamps() {
    let wb = minimal_workbook(&[
        &["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"],
        &["2024-03-04", "FMC", "A1", "SHIP", "0", "20"],
    ]);

    let outcome = loader().load_raw(wb);

    let invariant_errors: Vec<_> = outcome
        .report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::BalanceInvariant)
        .collect();
    assert_eq!(invariant_errors.len(), 1);
    assert_eq!(invariant_errors[0].sheet, "inventory ledger");
    assert_eq!(invariant_errors[0].row_number, Some(3));

    // 余额截断为 0 并标记无效,而不是悄悄为负
    assert_eq!(outcome.balances[0].current_cartons, 0);
    assert!(!outcome.balances[0].is_valid);
}

#[test]
fn test_unknown_sku_single_referential_error() {
    let wb = minimal_workbook(&[
        &["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"],
        &["2024-03-02", "FMC", "B2", "RECEIVE", "5", "0"],
    ]);

    let outcome = loader().load_raw(wb);

    // 恰好一条引用完整性错误,坐标指向 inventory ledger 行 3 列 SKU
    let ref_errors: Vec<_> = outcome
        .report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::ReferentialIntegrity)
        .collect();
    assert_eq!(ref_errors.len(), 1);
    assert_eq!(ref_errors[0].sheet, "inventory ledger");
    assert_eq!(ref_errors[0].row_number, Some(3));
    assert_eq!(ref_errors[0].column.as_deref(), Some("SKU"));
    assert_eq!(ref_errors[0].raw_value.as_deref(), Some("B2"));

    // 该行不进入任何实体输出
    assert_eq!(outcome.entities.inventory_ledger.len(), 1);
    assert!(outcome
        .entities
        .inventory_ledger
        .iter()
        .all(|e| e.sku_code != "B2"));
    assert!(outcome.balances.iter().all(|b| b.sku_code != "B2"));
}

// ==========================================
// 工作表匹配与缺表
// ==========================================

#[test]
fn test_empty_workbook_all_entities_zero_with_warnings() {
    let outcome = loader().load_raw(workbook(vec![]));

    for (_, count) in &outcome.report.entity_counts {
        assert_eq!(*count, 0);
    }
    assert!(outcome.balances.is_empty());

    // 四张必需工作表缺失 → 四条警告,无错误
    let missing: Vec<_> = outcome
        .report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::SchemaMismatch)
        .collect();
    assert_eq!(missing.len(), 4);
    assert!(missing.iter().all(|i| i.severity == IssueSeverity::Warning));
    assert_eq!(outcome.report.summary.error, 0);
}

#[test]
fn test_sheet_matching_case_and_whitespace_insensitive() {
    let wb = workbook(vec![sheet(
        "  SKU   Master ",
        &["SKU", "Units_Per_Carton", "Carton_Weight_KG"],
        &[&["A1", "24", "9.8"]],
    )]);

    let outcome = loader().load_raw(wb);

    assert_eq!(outcome.entities.skus.len(), 1);
    assert_eq!(outcome.entities.skus[0].sku_code, "A1");
}

#[test]
fn test_unknown_sheet_warning_not_fatal() {
    let mut wb = minimal_workbook(&[&["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"]]);
    wb.sheets
        .push(sheet("scratch notes", &["anything"], &[&["x"]]));

    let outcome = loader().load_raw(wb);

    let unknown: Vec<_> = outcome
        .report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::UnknownSheet && i.sheet == "scratch notes")
        .collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].severity, IssueSeverity::Warning);
    assert_eq!(outcome.report.summary.error, 0);
}

#[test]
fn test_duplicate_entity_sheet_first_wins() {
    let mut wb = minimal_workbook(&[&["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"]]);
    // 第二张 sku master（大小写不同）,应被忽略并记警告
    wb.sheets.push(sheet(
        "SKU MASTER",
        &["SKU", "Units_Per_Carton", "Carton_Weight_KG"],
        &[&["ZZ-9", "12", "4.2"]],
    ));

    let outcome = loader().load_raw(wb);

    assert_eq!(outcome.entities.skus.len(), 1);
    assert_eq!(outcome.entities.skus[0].sku_code, "A1");
    assert!(outcome
        .report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::DuplicateKey && i.sheet == "SKU MASTER"));
}

#[test]
fn test_missing_sku_master_with_ledger_is_entity_fatal() {
    let wb = workbook(vec![sheet(
        "inventory ledger",
        &[
            "Transaction_Date",
            "Warehouse",
            "SKU",
            "Transaction_Type",
            "Cartons_In",
        ],
        &[&["2024-03-01", "FMC", "A1", "RECEIVE", "10"]],
    )]);

    let outcome = loader().load_raw(wb);

    // SKU 主数据缺失 → 对依赖它的流水账为致命（ERROR）
    assert!(outcome.report.issues.iter().any(|i| {
        i.kind == IssueKind::SchemaMismatch
            && i.sheet == "sku master"
            && i.severity == IssueSeverity::Error
    }));
    assert!(outcome.report.has_errors());

    // 部分结果仍然返回,由调用方决定是否接受
    assert_eq!(outcome.entities.inventory_ledger.len(), 1);
    assert_eq!(outcome.balances.len(), 1);
}

#[test]
fn test_missing_required_column_skips_sheet() {
    let wb = workbook(vec![sheet(
        "sku master",
        &["SKU", "Description"],
        &[&["A1", "Cream 30ml"]],
    )]);

    let outcome = loader().load_raw(wb);

    assert!(outcome.entities.skus.is_empty());
    assert!(outcome.report.issues.iter().any(|i| {
        i.kind == IssueKind::SchemaMismatch
            && i.sheet == "sku master"
            && i.severity == IssueSeverity::Error
            && i.message.contains("Units_Per_Carton")
    }));
}

// ==========================================
// 行级校验与记录数
// ==========================================

#[test]
fn test_record_counts_equal_valid_rows() {
    let wb = minimal_workbook(&[
        &["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"],
        &["2024-03-02", "FMC", "A1", "RECEIVE", "bad", "0"], // 类型失败,剔除
        &["2024-03-03", "FMC", "A1", "SHIP", "0", "2"],
    ]);

    let outcome = loader().load_raw(wb);

    // 每行要么进入输出,要么带坐标出现在问题清单
    assert_eq!(outcome.entities.inventory_ledger.len(), 2);
    assert!(outcome.report.issues.iter().any(|i| {
        i.kind == IssueKind::RowValidation
            && i.sheet == "inventory ledger"
            && i.row_number == Some(3)
            && i.raw_value.as_deref() == Some("bad")
    }));
    assert_eq!(outcome.balances[0].current_cartons, 8);
}

#[test]
fn test_storage_ledger_monday_and_cost_rules() {
    let mut wb = minimal_workbook(&[&["2024-03-01", "FMC", "A1", "RECEIVE", "60", "0"]]);
    wb.sheets.push(sheet(
        "storage ledger",
        &[
            "Week_Ending_Date",
            "Warehouse",
            "SKU",
            "Batch_Lot",
            "Cartons_End_Of_Monday",
            "Storage_Pallets_Charged",
            "Applicable_Weekly_Rate",
            "Calculated_Weekly_Cost",
            "Billing_Period_Start",
            "Billing_Period_End",
        ],
        &[
            // 周一,费用一致,账期合法
            &[
                "2024-03-04", "FMC", "A1", "DEFAULT", "60", "2", "3.5", "7.0", "2024-02-16",
                "2024-03-15",
            ],
            // 周二 → 错误剔除
            &[
                "2024-03-05", "FMC", "A1", "DEFAULT", "60", "2", "3.5", "7.0", "", "",
            ],
            // 周一但费用对不上 → 警告保留
            &[
                "2024-03-11", "FMC", "A1", "DEFAULT", "60", "2", "3.5", "9.0", "", "",
            ],
        ],
    ));

    let outcome = loader().load_raw(wb);

    assert_eq!(outcome.entities.storage_ledger.len(), 2);
    assert!(outcome
        .report
        .issues
        .iter()
        .any(|i| i.sheet == "storage ledger" && i.message.contains("周一")));
    assert!(outcome
        .report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::CostMismatch && i.row_number == Some(4)));
}

#[test]
fn test_invoice_billing_period_rule() {
    let mut wb = minimal_workbook(&[&["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"]]);
    wb.sheets.push(sheet(
        "invoice input",
        &[
            "Invoice_Number",
            "Warehouse",
            "Billing_Period_Start",
            "Billing_Period_End",
            "Invoiced_Amount",
        ],
        &[
            &["INV-100", "FMC", "2024-03-16", "2024-04-15", "420.50"],
            &["INV-101", "FMC", "2024-03-01", "2024-03-31", "100.00"],
        ],
    ));

    let outcome = loader().load_raw(wb);

    assert_eq!(outcome.entities.invoice_inputs.len(), 2);
    let period_issues: Vec<_> = outcome
        .report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::BillingPeriod)
        .collect();
    assert_eq!(period_issues.len(), 1);
    assert_eq!(period_issues[0].row_number, Some(3));
}

#[test]
fn test_balance_sheet_cross_check() {
    let mut wb = minimal_workbook(&[&["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"]]);
    wb.sheets.push(sheet(
        "inventory balance",
        &["Warehouse", "SKU", "Batch_Lot", "Current_Cartons"],
        &[&["FMC", "A1", "DEFAULT", "8"]],
    ));

    let outcome = loader().load_raw(wb);

    assert!(outcome.report.issues.iter().any(|i| {
        i.kind == IssueKind::BalanceMismatch
            && i.sheet == "inventory balance"
            && i.message.contains("10")
    }));
}

// ==========================================
// 确定性
// ==========================================

#[test]
fn test_identical_input_identical_outcome() {
    let build = || {
        minimal_workbook(&[
            &["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"],
            &["2024-03-04", "FMC", "A1", "SHIP", "0", "4"],
            &["2024-03-02", "FMC", "B2", "RECEIVE", "5", "0"],
        ])
    };

    let first = loader().load_raw(build());
    let second = loader().load_raw(build());

    // 记录、余额、问题清单及其顺序完全一致（批次 ID 除外）
    let key = |o: &wms_importer::ImportOutcome| {
        serde_json::to_string(&(&o.entities, &o.balances, &o.report.issues)).unwrap()
    };
    assert_eq!(key(&first), key(&second));
}

// ==========================================
// 文件端到端（CSV）
// ==========================================

#[test]
fn test_csv_file_end_to_end() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sku master.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "SKU,Units_Per_Carton,Carton_Weight_KG").unwrap();
    writeln!(file, "CS-007,24,9.8").unwrap();
    writeln!(file, "CS-011,36,12.1").unwrap();
    drop(file);

    let outcome = loader().load_from_path(&path).unwrap();

    assert_eq!(outcome.entities.skus.len(), 2);
    assert_eq!(outcome.entities.skus[0].sku_code, "CS-007");

    // CSV 只承载一张表,其余必需表缺失 → 警告而非错误
    assert_eq!(outcome.report.summary.error, 0);
    assert!(outcome.report.summary.warning > 0);
}

#[test]
fn test_unreadable_file_is_fatal() {
    let loader = loader();
    let result = loader.load_from_path(std::path::Path::new("no-such-dir/wb.xlsx"));
    assert!(result.is_err());
}

// ==========================================
// 实体统计口径
// ==========================================

#[test]
fn test_entity_counts_reported() {
    let wb = minimal_workbook(&[&["2024-03-01", "FMC", "A1", "RECEIVE", "10", "0"]]);
    let outcome = loader().load_raw(wb);

    let count_of = |kind: EntityKind| {
        outcome
            .report
            .entity_counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| *c)
            .unwrap()
    };

    assert_eq!(count_of(EntityKind::SkuMaster), 1);
    assert_eq!(count_of(EntityKind::WarehouseConfig), 1);
    assert_eq!(count_of(EntityKind::CostMaster), 1);
    assert_eq!(count_of(EntityKind::InventoryLedger), 1);
    assert_eq!(count_of(EntityKind::StorageLedger), 0);
}
