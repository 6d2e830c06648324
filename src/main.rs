// ==========================================
// 站点资源运营分析 - 命令行入口
// ==========================================
// 子命令:
// - report    (默认): 加载 → 流水线 → 写出执行报告
// - dashboard: 筛选 / 排序 / 站点下钻, 结果输出到控制台
// 失败时输出错误类别与受影响标识, 返回非 0 退出码
// ==========================================

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use site_resource_ops::api::{ApiError, ApiResult, DashboardApi, DashboardFilter, ReportApi, SiteSort};
use site_resource_ops::config::ConfigManager;
use site_resource_ops::i18n::{self, t_with_args};
use site_resource_ops::report::render_console_summary;
use site_resource_ops::{logging, APP_NAME, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;

/// 站点资源利用与损耗分析
#[derive(Parser, Debug)]
#[command(name = "site-ops", version)]
#[command(about = "Site resource utilization and loss analytics")]
struct Cli {
    /// 配置文件路径 (JSON)
    #[arg(long, global = true, env = "OPS_CONFIG")]
    config: Option<PathBuf>,

    /// 输出语言 (en / zh-CN)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 生成执行报告
    Report(ReportArgs),
    /// 驾驶舱查询
    Dashboard(DashboardArgs),
}

#[derive(clap::Args, Debug, Default)]
struct ReportArgs {
    /// 数据目录 (覆盖配置)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 报告目录 (覆盖配置)
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// 同时写出 JSON 输出契约
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct DashboardArgs {
    /// 数据目录 (覆盖配置)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 站点筛选 (可重复)
    #[arg(long = "site")]
    sites: Vec<String>,

    /// 起始日期 (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// 截止日期 (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// 站点排序
    #[arg(long, value_enum, default_value_t = SortArg::Risk)]
    sort: SortArg,

    /// 下钻站点
    #[arg(long)]
    drill: Option<String>,

    /// 以 JSON 输出视图
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Risk,
    Cost,
}

impl From<SortArg> for SiteSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Risk => SiteSort::RiskRank,
            SortArg::Cost => SiteSort::CostLeakage,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_json);

    tracing::info!("{} v{}", APP_NAME, VERSION);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(category = err.category(), "运行失败: {}", err);
            eprintln!("[{}] {}", err.category(), err);
            let ids = err.affected_ids();
            if !ids.is_empty() {
                eprintln!("  affected: {}", ids.join(", "));
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> ApiResult<()> {
    let mut config = ConfigManager::load(cli.config.as_deref())?;
    if let Some(locale) = &cli.locale {
        config.set_locale(locale);
        config.validate()?;
    }
    // 建议动作文本在编排器构造时按当前语言取值
    i18n::set_locale(config.locale());

    match cli.command.unwrap_or(Command::Report(ReportArgs::default())) {
        Command::Report(args) => run_report(config, args),
        Command::Dashboard(args) => run_dashboard(config, args),
    }
}

fn run_report(mut config: ConfigManager, args: ReportArgs) -> ApiResult<()> {
    if let Some(dir) = args.data_dir {
        config.set_data_dir(dir);
    }
    if let Some(dir) = args.reports_dir {
        config.set_reports_dir(dir);
    }

    let outcome = ReportApi::new(config).generate(args.json)?;

    print!("{}", render_console_summary(&outcome.output));
    println!(
        "{}",
        t_with_args(
            "cli.report_written",
            &[("path", &outcome.report_path.display().to_string())]
        )
    );
    println!(
        "{}",
        t_with_args(
            "cli.markdown_written",
            &[("path", &outcome.markdown_path.display().to_string())]
        )
    );
    if let Some(path) = &outcome.summary_path {
        println!(
            "{}",
            t_with_args("cli.summary_written", &[("path", &path.display().to_string())])
        );
    }
    Ok(())
}

fn run_dashboard(mut config: ConfigManager, args: DashboardArgs) -> ApiResult<()> {
    if let Some(dir) = args.data_dir.clone() {
        config.set_data_dir(dir);
    }

    let api = ReportApi::new(config);
    let dashboard = DashboardApi::new(api.load_dataset()?, api.orchestrator()?)?;

    print!("{}", render_dashboard(&dashboard, &args)?);
    Ok(())
}

/// 驾驶舱输出文本 (控制台表格或 JSON)
fn render_dashboard(dashboard: &DashboardApi, args: &DashboardArgs) -> ApiResult<String> {
    let filter = DashboardFilter {
        sites: args.sites.clone(),
        date_from: args.from,
        date_to: args.to,
        sort: args.sort.into(),
    };

    if let Some(site_id) = &args.drill {
        let drilldown = dashboard.drilldown(site_id, &filter)?;
        return if args.json {
            Ok(to_pretty_json(&drilldown)? + "\n")
        } else {
            Ok(drilldown.render_console())
        };
    }

    let view = dashboard.query(&filter)?;
    if args.json {
        Ok(to_pretty_json(&view)? + "\n")
    } else {
        Ok(view.render_console())
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use site_resource_ops::config::RiskThresholds;
    use site_resource_ops::domain::site::{Dataset, SiteAttributes, SiteDayRecord, SiteMaster};
    use site_resource_ops::domain::types::DataQualityPolicy;
    use site_resource_ops::engine::{ActionTable, PipelineOrchestrator};
    use site_resource_ops::i18n::t;

    fn record(site_id: &str, disposed: f64, unit_cost: f64) -> SiteDayRecord {
        SiteDayRecord {
            site_id: site_id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            planned_units: 100.0,
            actual_units: 95.0,
            disposed_units: disposed,
            unit_cost,
            usable_units: None,
            loss_reason: None,
            staffing_shortfall: false,
            supplier_delay: false,
            temp_excursion: false,
            row_number: 2,
        }
    }

    /// S-ALPHA: 损耗率 0.2 (干预), 成本 20; S-BRAVO: 损耗率 0.06 (关注), 成本 600
    fn dashboard() -> DashboardApi {
        let records = vec![record("S-ALPHA", 20.0, 1.0), record("S-BRAVO", 6.0, 100.0)];
        let mut master = SiteMaster::new();
        master.insert(SiteAttributes::bare("S-ALPHA"));
        master.insert(SiteAttributes::bare("S-BRAVO"));

        let orchestrator = PipelineOrchestrator::new(
            RiskThresholds::default(),
            ActionTable::default(),
            DataQualityPolicy::default(),
            10,
        )
        .unwrap();
        DashboardApi::new(Dataset::new(master, records), orchestrator).unwrap()
    }

    fn dashboard_args(argv: &[&str]) -> DashboardArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Command::Dashboard(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    /// 站点列表段内的站点顺序
    fn listed_order(text: &str, heading_key: &str) -> Vec<&'static str> {
        let listing = &text[text.find(&t(heading_key)).unwrap()..];
        let mut ids = vec!["S-ALPHA", "S-BRAVO"];
        ids.sort_by_key(|id| listing.find(id).unwrap());
        ids
    }

    #[test]
    fn test_dashboard_default_sort_is_risk() {
        let args = dashboard_args(&["site-ops", "dashboard"]);
        let text = render_dashboard(&dashboard(), &args).unwrap();

        assert_eq!(listed_order(&text, "cli.sites_by_risk"), vec!["S-ALPHA", "S-BRAVO"]);
    }

    #[test]
    fn test_dashboard_cost_sort_reorders_listing() {
        let args = dashboard_args(&["site-ops", "dashboard", "--sort", "cost"]);
        let text = render_dashboard(&dashboard(), &args).unwrap();

        assert_eq!(listed_order(&text, "cli.sites_by_cost"), vec!["S-BRAVO", "S-ALPHA"]);
        assert!(!text.contains(&t("cli.sites_by_risk")));
    }

    #[test]
    fn test_dashboard_json_follows_sort() {
        let args = dashboard_args(&["site-ops", "dashboard", "--sort", "cost", "--json"]);
        let text = render_dashboard(&dashboard(), &args).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["sites"][0]["site_id"], "S-BRAVO");
        assert_eq!(value["filter"]["sort"], "COST_LEAKAGE");
    }

    #[test]
    fn test_drilldown_text_includes_summaries_and_mix() {
        let args = dashboard_args(&[
            "site-ops",
            "dashboard",
            "--drill",
            "S-BRAVO",
            "--from",
            "2025-01-01",
        ]);
        let text = render_dashboard(&dashboard(), &args).unwrap();

        assert!(text.contains(&t("cli.drill_all_data")));
        assert!(text.contains(&t("cli.drill_filtered")));
        assert!(text.contains(&t("cli.drill_mix")));
        assert!(text.contains(&t("cli.drill_daily")));
        assert!(text.contains("2025-01-01"));
        assert!(text.contains("600.00"));
    }

    #[test]
    fn test_drilldown_empty_window_keeps_full_summary() {
        let args = dashboard_args(&[
            "site-ops",
            "dashboard",
            "--drill",
            "S-BRAVO",
            "--from",
            "2025-02-01",
        ]);
        let text = render_dashboard(&dashboard(), &args).unwrap();

        assert!(text.contains(&t("cli.drill_all_data")));
        assert!(!text.contains(&t("cli.drill_filtered")));
        assert!(text.contains(&t("cli.drill_empty")));
    }
}
