// ==========================================
// 仓储管理数据导入系统 - 文件解析器实现
// ==========================================
// 职责: 文件读取与解析（阶段 0）
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 说明: 文件句柄作用域限定在解析调用内,
//       任何退出路径（包括错误）都会释放
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::loader_trait::FileParser;
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// 原始行 / 原始工作表 / 原始工作簿
// ==========================================
// 行号为物理行号（表头为第 1 行,数据从第 2 行起）,
// 跳过空白行不影响后续行的编号

/// 解析后的原始行（列名 → 单元格文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,               // 物理行号（1 起,含表头）
    pub cells: HashMap<String, String>,  // 列名 → 原始值（已 TRIM）
}

impl RawRow {
    /// 读取单元格,空白视为缺失
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// 解析后的原始工作表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSheet {
    pub name: String,         // 工作表名（原始）
    pub headers: Vec<String>, // 表头（第 1 行,已 TRIM）
    pub rows: Vec<RawRow>,    // 非空白数据行,保持文件顺序
}

/// 解析后的原始工作簿
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawWorkbook {
    pub source: String,        // 源文件路径
    pub sheets: Vec<RawSheet>, // 工作表,保持文件顺序
}

/// 表头行 + 数据行 → RawRow 列表（空白行跳过,行号保留）
fn rows_from_cells(
    headers: &[String],
    data_rows: impl Iterator<Item = (usize, Vec<String>)>,
) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for (row_number, values) in data_rows {
        let mut cells = HashMap::new();
        for (col_idx, value) in values.into_iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if !header.is_empty() {
                    cells.insert(header.clone(), value.trim().to_string());
                }
            }
        }

        // 跳过完全空白的行
        if cells.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(RawRow { row_number, cells });
    }
    rows
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 与 CSV 不同,一个 Excel 工作簿包含多张工作表,
// 全部解析并保持工作簿内顺序
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<RawWorkbook> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开 Excel 文件（作用域结束即释放句柄）
        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::new();

        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

            let mut cell_rows = range.rows();

            // 表头（第一行）; 无表头的空工作表保留为零行
            let headers: Vec<String> = match cell_rows.next() {
                Some(header_row) => header_row
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect(),
                None => {
                    sheets.push(RawSheet {
                        name: sheet_name,
                        headers: Vec::new(),
                        rows: Vec::new(),
                    });
                    continue;
                }
            };

            let data = cell_rows.enumerate().map(|(idx, row)| {
                // 表头为第 1 行,数据行从第 2 行起
                let values: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
                (idx + 2, values)
            });

            let rows = rows_from_cells(&headers, data);
            sheets.push(RawSheet {
                name: sheet_name,
                headers,
                rows,
            });
        }

        Ok(RawWorkbook {
            source: file_path.display().to_string(),
            sheets,
        })
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
// CSV 没有工作表概念,以文件名（去扩展名）作为表名
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<RawWorkbook> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if ext.to_string_lossy().to_lowercase() != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let sheet_name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "csv".to_string());

        // 打开 CSV 文件（作用域结束即释放句柄）
        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut data = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let values: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            // 表头为第 1 行,数据行从第 2 行起
            data.push((idx + 2, values));
        }

        let rows = rows_from_cells(&headers, data.into_iter());
        Ok(RawWorkbook {
            source: file_path.display().to_string(),
            sheets: vec![RawSheet {
                name: sheet_name,
                headers,
                rows,
            }],
        })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<RawWorkbook> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_workbook(file_path),
            "xlsx" | "xls" => ExcelParser.parse_workbook(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = csv_file(&[
            "SKU,Units_Per_Carton,Carton_Weight_KG",
            "CS-007,24,9.8",
            "CS-011,36,12.1",
        ]);

        let workbook = CsvParser.parse_workbook(temp_file.path()).unwrap();

        assert_eq!(workbook.sheets.len(), 1);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("SKU"), Some("CS-007"));
        assert_eq!(sheet.rows[0].get("Units_Per_Carton"), Some("24"));
        assert_eq!(sheet.rows[0].row_number, 2);
        assert_eq!(sheet.rows[1].row_number, 3);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_workbook(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_blank_rows_keeps_numbering() {
        let temp_file = csv_file(&[
            "SKU,Units_Per_Carton",
            "CS-007,24",
            ",",
            "CS-011,36",
        ]);

        let workbook = CsvParser.parse_workbook(temp_file.path()).unwrap();
        let sheet = &workbook.sheets[0];

        // 空白行被跳过,但后续行保留物理行号
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].row_number, 2);
        assert_eq!(sheet.rows[1].row_number, 4);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse_workbook(Path::new("workbook.ods"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_raw_row_blank_cell_is_missing() {
        let mut cells = HashMap::new();
        cells.insert("SKU".to_string(), "".to_string());
        cells.insert("Notes".to_string(), "ok".to_string());
        let row = RawRow {
            row_number: 2,
            cells,
        };

        assert_eq!(row.get("SKU"), None);
        assert_eq!(row.get("Notes"), Some("ok"));
        assert_eq!(row.get("Missing"), None);
    }
}
