// ==========================================
// 仓储管理数据导入系统 - 测试辅助
// ==========================================
// 职责: 在内存中构造原始工作簿,供集成测试复用
// ==========================================

use wms_importer::{RawRow, RawSheet, RawWorkbook};

/// 构造原始工作表（数据行号从 2 起,与解析器口径一致）
pub fn sheet(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawSheet {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rows = rows
        .iter()
        .enumerate()
        .map(|(idx, values)| RawRow {
            row_number: idx + 2,
            cells: headers
                .iter()
                .cloned()
                .zip(values.iter().map(|v| v.trim().to_string()))
                .filter(|(_, v)| !v.is_empty())
                .collect(),
        })
        .collect();

    RawSheet {
        name: name.to_string(),
        headers,
        rows,
    }
}

/// 构造原始工作簿
pub fn workbook(sheets: Vec<RawSheet>) -> RawWorkbook {
    RawWorkbook {
        source: "memory://test-workbook".to_string(),
        sheets,
    }
}

/// 四张必需工作表齐备的最小工作簿:
/// SKU A1, 仓库 FMC 配置齐全, 费率一行, 流水账行由调用方传入
pub fn minimal_workbook(ledger_rows: &[&[&str]]) -> RawWorkbook {
    workbook(vec![
        sheet(
            "sku master",
            &["SKU", "Units_Per_Carton", "Carton_Weight_KG"],
            &[&["A1", "24", "9.8"]],
        ),
        sheet(
            "warehouse config",
            &["Warehouse", "SKU", "Cartons_Per_Pallet"],
            &[&["FMC", "A1", "30"]],
        ),
        sheet(
            "cost master",
            &[
                "warehouse",
                "cost_category",
                "cost_name",
                "cost_value",
                "unit_of_measure",
            ],
            &[&["FMC", "Storage", "Weekly pallet storage", "3.5", "pallet"]],
        ),
        sheet(
            "inventory ledger",
            &[
                "Transaction_Date",
                "Warehouse",
                "SKU",
                "Transaction_Type",
                "Cartons_In",
                "Cartons_Out",
            ],
            ledger_rows,
        ),
    ])
}
