// ==========================================
// 仓储管理数据导入系统 - 工作簿加载器实现
// ==========================================
// 职责: 整合导入流程,从文件到已校验记录集
// 流程: 解析 → 匹配 → 映射 → 实体校验 → 引用校验 → 余额重放
// 保证: 字节相同的输入产生完全相同的结果（含问题顺序）;
//       任何一行要么进入输出,要么带原始坐标出现在问题清单
// ==========================================

use crate::config::LoaderOptions;
use crate::domain::records::EntityCollections;
use crate::domain::report::{
    ImportOutcome, ImportReport, IssueKind, IssueSeverity, IssueSummary, ValidationIssue,
};
use crate::domain::types::EntityKind;
use crate::importer::balance_replayer::BalanceReplayer;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{
    map_balance, map_calculated_cost, map_cost_rate, map_invoice_input, map_ledger_entry, map_sku,
    map_storage_ledger, map_warehouse_config, RowReader,
};
use crate::importer::file_parser::{RawSheet, RawWorkbook, UniversalFileParser};
use crate::importer::loader_trait::{FileParser, WorkbookLoader};
use crate::importer::ref_checker::RefChecker;
use crate::importer::schema::SchemaRegistry;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// WorkbookLoaderImpl - 工作簿加载器
// ==========================================
pub struct WorkbookLoaderImpl {
    file_parser: Box<dyn FileParser>,
    options: LoaderOptions,
}

impl WorkbookLoaderImpl {
    pub fn new(file_parser: Box<dyn FileParser>, options: LoaderOptions) -> Self {
        Self {
            file_parser,
            options,
        }
    }

    /// 缺省装配: 按扩展名选择解析器 + 缺省选项
    pub fn with_defaults() -> Self {
        Self::new(Box::new(UniversalFileParser), LoaderOptions::default())
    }

    /// 步骤 1: 工作表与实体匹配
    ///
    /// 按工作簿顺序扫描; 同一实体匹配到多张表时首张生效,
    /// 后续记警告; 未识别的表记警告（严格模式升级为错误）
    fn match_sheets<'wb>(
        &self,
        workbook: &'wb RawWorkbook,
        issues: &mut Vec<ValidationIssue>,
    ) -> BTreeMap<EntityKind, &'wb RawSheet> {
        let mut matched: BTreeMap<EntityKind, &RawSheet> = BTreeMap::new();

        for sheet in &workbook.sheets {
            match SchemaRegistry::match_sheet(&sheet.name) {
                Some(kind) => {
                    if matched.contains_key(&kind) {
                        warn!(sheet = %sheet.name, entity = %kind, "实体重复匹配,首张工作表生效");
                        issues.push(ValidationIssue::sheet_level(
                            IssueSeverity::Warning,
                            IssueKind::DuplicateKey,
                            sheet.name.clone(),
                            format!("实体 {} 已由先前的工作表匹配,此表忽略", kind),
                        ));
                    } else {
                        matched.insert(kind, sheet);
                    }
                }
                None => {
                    let severity = if self.options.strict_unknown_sheets {
                        IssueSeverity::Error
                    } else {
                        IssueSeverity::Warning
                    };
                    issues.push(ValidationIssue::sheet_level(
                        severity,
                        IssueKind::UnknownSheet,
                        sheet.name.clone(),
                        "未识别的工作表,未匹配任何实体".to_string(),
                    ));
                }
            }
        }

        matched
    }

    /// 步骤 2: 必需工作表缺失检查
    ///
    /// 缺表本身记警告（实体输出为零行）; 当缺失的主数据被
    /// 已存在的下游表引用时,升级为该实体的错误
    fn check_missing_sheets(
        &self,
        matched: &BTreeMap<EntityKind, &RawSheet>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for schema in SchemaRegistry::entries() {
            if !schema.sheet_required || matched.contains_key(&schema.kind) {
                continue;
            }

            // SKU 主数据缺失且存在引用它的下游表 → 错误
            let dependents_present = [
                EntityKind::WarehouseConfig,
                EntityKind::InventoryLedger,
                EntityKind::InventoryBalance,
                EntityKind::StorageLedger,
            ]
            .iter()
            .any(|k| matched.get(k).map(|s| !s.rows.is_empty()).unwrap_or(false));

            if schema.kind == EntityKind::SkuMaster && dependents_present {
                issues.push(ValidationIssue::sheet_level(
                    IssueSeverity::Error,
                    IssueKind::SchemaMismatch,
                    schema.kind.sheet_name(),
                    "必需工作表缺失,下游表的 SKU 引用无法校验".to_string(),
                ));
            } else {
                issues.push(ValidationIssue::sheet_level(
                    IssueSeverity::Warning,
                    IssueKind::SchemaMismatch,
                    schema.kind.sheet_name(),
                    "必需工作表缺失,该实体输出为零行".to_string(),
                ));
            }
        }
    }

    /// 步骤 3: 单表字段映射
    ///
    /// 必填列整列缺失 → 表级 SchemaMismatch 错误,跳过整表;
    /// 否则逐行映射,失败行只出现在问题清单
    fn map_sheet<T>(
        sheet: &RawSheet,
        kind: EntityKind,
        issues: &mut Vec<ValidationIssue>,
        map_row: impl Fn(&RowReader<'_>, &crate::importer::file_parser::RawRow, &mut Vec<ValidationIssue>) -> Option<T>,
    ) -> Vec<T> {
        let schema = SchemaRegistry::schema_for(kind);
        let (resolved, missing) = schema.resolve_columns(&sheet.headers);

        if !missing.is_empty() {
            issues.push(ValidationIssue::sheet_level(
                IssueSeverity::Error,
                IssueKind::SchemaMismatch,
                sheet.name.clone(),
                format!("必填列缺失: {}", missing.join(", ")),
            ));
            return Vec::new();
        }

        let reader = RowReader::new(&sheet.name, &resolved);
        let mut records = Vec::new();
        for row in &sheet.rows {
            if let Some(record) = map_row(&reader, row, issues) {
                records.push(record);
            }
        }
        records
    }
}

impl WorkbookLoader for WorkbookLoaderImpl {
    fn load_from_path(&self, file_path: &Path) -> ImportResult<ImportOutcome> {
        info!(file_path = %file_path.display(), "开始加载工作簿");
        let workbook = self.file_parser.parse_workbook(file_path)?;
        info!(sheets = workbook.sheets.len(), "文件解析完成");
        Ok(self.load_raw(workbook))
    }

    fn load_raw(&self, workbook: RawWorkbook) -> ImportOutcome {
        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let source = workbook.source.clone();
        let mut issues: Vec<ValidationIssue> = Vec::new();

        info!(batch_id = %batch_id, source = %source, "开始模式映射");

        // === 步骤 1: 工作表匹配 ===
        debug!("步骤 1: 工作表与实体匹配");
        let matched = self.match_sheets(&workbook, &mut issues);
        info!(matched = matched.len(), "工作表匹配完成");

        // === 步骤 2: 必需工作表缺失检查 ===
        debug!("步骤 2: 必需工作表缺失检查");
        self.check_missing_sheets(&matched, &mut issues);

        // helper 表仅识别,不校验不产出
        if matched.contains_key(&EntityKind::Helper) {
            issues.push(ValidationIssue::sheet_level(
                IssueSeverity::Info,
                IssueKind::UnknownSheet,
                EntityKind::Helper.sheet_name(),
                "辅助工作表,跳过校验".to_string(),
            ));
        }

        // === 步骤 3: 字段映射（注册表声明顺序）===
        debug!("步骤 3: 字段映射与类型转换");
        let mut entities = EntityCollections::default();

        if let Some(&sheet) = matched.get(&EntityKind::SkuMaster) {
            entities.skus = Self::map_sheet(sheet, EntityKind::SkuMaster, &mut issues, map_sku);
        }
        if let Some(&sheet) = matched.get(&EntityKind::WarehouseConfig) {
            entities.warehouse_configs = Self::map_sheet(
                sheet,
                EntityKind::WarehouseConfig,
                &mut issues,
                map_warehouse_config,
            );
        }
        if let Some(&sheet) = matched.get(&EntityKind::CostMaster) {
            entities.cost_rates =
                Self::map_sheet(sheet, EntityKind::CostMaster, &mut issues, map_cost_rate);
        }
        if let Some(&sheet) = matched.get(&EntityKind::InventoryLedger) {
            entities.inventory_ledger = Self::map_sheet(
                sheet,
                EntityKind::InventoryLedger,
                &mut issues,
                map_ledger_entry,
            );
        }
        if let Some(&sheet) = matched.get(&EntityKind::InventoryBalance) {
            entities.inventory_balances =
                Self::map_sheet(sheet, EntityKind::InventoryBalance, &mut issues, map_balance);
        }
        if let Some(&sheet) = matched.get(&EntityKind::StorageLedger) {
            entities.storage_ledger = Self::map_sheet(
                sheet,
                EntityKind::StorageLedger,
                &mut issues,
                map_storage_ledger,
            );
        }
        if let Some(&sheet) = matched.get(&EntityKind::CalculatedCostsLedger) {
            entities.calculated_costs = Self::map_sheet(
                sheet,
                EntityKind::CalculatedCostsLedger,
                &mut issues,
                map_calculated_cost,
            );
        }
        if let Some(&sheet) = matched.get(&EntityKind::InvoiceInput) {
            entities.invoice_inputs = Self::map_sheet(
                sheet,
                EntityKind::InvoiceInput,
                &mut issues,
                map_invoice_input,
            );
        }
        info!(
            skus = entities.skus.len(),
            ledger = entities.inventory_ledger.len(),
            "字段映射完成"
        );

        // === 步骤 4: 实体级校验 ===
        debug!("步骤 4: 实体级校验");
        let validator = DqValidator::new(self.options.cost_tolerance);
        entities.skus = validator.validate_skus(std::mem::take(&mut entities.skus), &mut issues);
        entities.warehouse_configs = validator
            .validate_warehouse_configs(std::mem::take(&mut entities.warehouse_configs), &mut issues);
        entities.cost_rates =
            validator.validate_cost_rates(std::mem::take(&mut entities.cost_rates), &mut issues);
        validator.validate_ledger(&entities.inventory_ledger, &mut issues);
        entities.inventory_balances = validator
            .validate_balances(std::mem::take(&mut entities.inventory_balances), &mut issues);
        entities.storage_ledger = validator
            .validate_storage_ledger(std::mem::take(&mut entities.storage_ledger), &mut issues);
        validator.validate_calculated_costs(&entities.calculated_costs, &mut issues);
        validator.validate_invoice_inputs(&entities.invoice_inputs, &mut issues);
        debug!("实体级校验完成");

        // === 步骤 5: 引用完整性（仅当 SKU 主数据表存在）===
        debug!("步骤 5: 引用完整性交叉校验");
        if matched.contains_key(&EntityKind::SkuMaster) {
            let known: Vec<String> = entities.skus.iter().map(|s| s.sku_code.clone()).collect();
            let checker = RefChecker::new(known.iter().map(|s| s.as_str()));

            entities.warehouse_configs = checker
                .check_warehouse_configs(std::mem::take(&mut entities.warehouse_configs), &mut issues);
            entities.inventory_ledger = checker.check_ledger(
                std::mem::take(&mut entities.inventory_ledger),
                &entities.warehouse_configs,
                &mut issues,
            );
            entities.inventory_balances =
                checker.check_balances(std::mem::take(&mut entities.inventory_balances), &mut issues);
            entities.storage_ledger = checker
                .check_storage_ledger(std::mem::take(&mut entities.storage_ledger), &mut issues);
        } else {
            debug!("SKU 主数据缺失,跳过引用完整性校验");
        }

        // === 步骤 6: 流水账重放生成余额 ===
        debug!("步骤 6: 流水账重放");
        let balances = BalanceReplayer::replay(&entities.inventory_ledger, &mut issues);
        if self.options.cross_check_balances && !entities.inventory_balances.is_empty() {
            BalanceReplayer::cross_check(&entities.inventory_balances, &balances, &mut issues);
        }
        info!(balances = balances.len(), "流水账重放完成");

        // === 汇总报告 ===
        let summary = IssueSummary::tally(&issues);
        info!(
            info = summary.info,
            warning = summary.warning,
            error = summary.error,
            "导入完成"
        );

        let report = ImportReport {
            batch_id,
            source,
            started_at,
            entity_counts: entities.counts(),
            summary,
            issues,
        };

        ImportOutcome {
            entities,
            balances,
            report,
        }
    }
}
