// ==========================================
// 仓储管理数据导入系统 - CLI 主入口
// ==========================================
// 用法:
//   wms-importer                 打印帮助,退出码 0
//   wms-importer <工作簿路径>    加载并校验,退出码 0/1
// ==========================================

use std::path::Path;
use std::process::ExitCode;
use wms_importer::i18n;
use wms_importer::importer::{WorkbookLoader, WorkbookLoaderImpl};

fn print_usage() {
    println!("==================================================");
    println!("{} v{}", wms_importer::APP_NAME, wms_importer::VERSION);
    println!("==================================================");
    println!();
    println!("{}", i18n::t("cli.usage"));
}

/// 加载工作簿并打印报告
///
/// 完整问题清单在结果之后一次性输出,不与记录统计交错
fn run(path: &Path) -> ExitCode {
    let loader = WorkbookLoaderImpl::with_defaults();

    let outcome = match loader.load_from_path(path) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!(
                "{}",
                i18n::t_with_args("import.fatal", &[("message", &err.to_string())])
            );
            return ExitCode::from(1);
        }
    };

    let report = &outcome.report;

    println!("==================================================");
    println!("{}  {}", wms_importer::APP_NAME, report.batch_id);
    println!("==================================================");
    println!();
    println!("{}:", i18n::t("cli.entity_counts"));
    for (kind, count) in &report.entity_counts {
        println!("  {:<24} {}", kind.to_string(), count);
    }
    println!();
    println!("{}: {}", i18n::t("cli.balances"), outcome.balances.len());
    println!();

    if report.issues.is_empty() {
        println!("{}", i18n::t("cli.no_issues"));
    } else {
        println!(
            "{} (INFO {} / WARNING {} / ERROR {}):",
            i18n::t("cli.issues"),
            report.summary.info,
            report.summary.warning,
            report.summary.error
        );
        for issue in &report.issues {
            println!("  {}", issue);
        }
    }
    println!();

    if report.has_errors() {
        println!("{}", i18n::t("common.failed"));
        ExitCode::from(1)
    } else {
        println!("{}", i18n::t("common.success"));
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    wms_importer::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            print_usage();
            ExitCode::SUCCESS
        }
        [path] => run(Path::new(path)),
        _ => {
            print_usage();
            ExitCode::from(1)
        }
    }
}
