// ==========================================
// 站点资源运营分析 - 控制台摘要
// ==========================================
// 工具: comfy-table
// 用途: CLI 打印整体 KPI / 站点列表 / 成本排名 / 站点下钻
// 站点列表保持调用方给定的顺序, 不在此处重新排序
// ==========================================

use crate::domain::risk::ClassifiedRecord;
use crate::domain::summary::{DriverMixEntry, PipelineOutput, RankedSite, SiteSummary};
use crate::domain::types::RiskClassification;
use crate::i18n::t;
use crate::report::format::{fmt_int, fmt_money, fmt_pct, fmt_rate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

fn status_color(classification: RiskClassification) -> Color {
    match classification {
        RiskClassification::InterventionRequired => Color::Red,
        RiskClassification::Watch => Color::Yellow,
        RiskClassification::Normal => Color::Green,
    }
}

fn classification_cell(classification: RiskClassification) -> Cell {
    Cell::new(classification.label()).fg(status_color(classification))
}

fn new_table(header_keys: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header_keys.iter().map(|key| t(key)).collect::<Vec<_>>());
    table
}

/// 整体 KPI 表
pub fn overall_table(output: &PipelineOutput) -> Table {
    let o = &output.portfolio.overall;
    let mut table = new_table(&["report.metric", "report.value"]);

    table.add_row(vec![t("metric.sites"), o.site_count.to_string()]);
    table.add_row(vec![t("metric.records"), o.record_count.to_string()]);
    table.add_row(vec![t("metric.excluded_records"), o.excluded_record_count.to_string()]);
    table.add_row(vec![t("metric.disposed_units"), fmt_int(o.disposed_units)]);
    table.add_row(vec![t("metric.cost_leakage"), fmt_money(o.cost_leakage)]);
    table.add_row(vec![t("metric.avg_loss_rate"), fmt_rate(o.avg_loss_rate)]);
    table.add_row(vec![t("metric.avg_utilization"), fmt_rate(o.avg_utilization_rate)]);
    table.add_row(vec![t("metric.shock_days"), o.shock_days.to_string()]);
    table
}

/// 高风险站点表 (组合汇总中的 top-N)
pub fn risk_table(output: &PipelineOutput) -> Table {
    let mut table = new_table(&[
        "col.rank",
        "col.site_id",
        "col.worst",
        "col.status",
        "col.cost_leakage",
        "col.driver",
        "col.share",
    ]);

    for ranked in &output.portfolio.top_risk_sites {
        let share = output
            .site(&ranked.site_id)
            .map(|s| fmt_pct(s.dominant_driver_share, 1))
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(ranked.rank),
            Cell::new(&ranked.site_id),
            classification_cell(ranked.worst_classification),
            classification_cell(ranked.status),
            Cell::new(fmt_money(ranked.cost_leakage)),
            Cell::new(ranked.dominant_driver.label()),
            Cell::new(share),
        ]);
    }
    table
}

/// 站点列表 (按传入顺序编号)
pub fn site_table(sites: &[SiteSummary]) -> Table {
    let mut table = new_table(&[
        "col.rank",
        "col.site_id",
        "col.worst",
        "col.status",
        "col.cost_leakage",
        "col.loss_rate",
        "col.driver",
        "col.share",
    ]);

    for (i, site) in sites.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&site.site_id),
            classification_cell(site.worst_classification),
            classification_cell(site.status),
            Cell::new(fmt_money(site.cost_leakage)),
            Cell::new(fmt_rate(site.weighted_loss_rate)),
            Cell::new(site.dominant_driver.label()),
            Cell::new(fmt_pct(site.dominant_driver_share, 1)),
        ]);
    }
    table
}

/// 成本泄漏排名表
pub fn cost_table(ranked: &[RankedSite]) -> Table {
    let mut table = new_table(&[
        "col.rank",
        "col.site_id",
        "col.cost_leakage",
        "col.worst",
        "col.driver",
    ]);

    for site in ranked {
        table.add_row(vec![
            Cell::new(site.rank),
            Cell::new(&site.site_id),
            Cell::new(fmt_money(site.cost_leakage)),
            classification_cell(site.worst_classification),
            Cell::new(site.dominant_driver.label()),
        ]);
    }
    table
}

/// 站点汇总对照表 (每行一个口径, 如全量 / 筛选窗口)
pub fn summary_table(rows: &[(String, &SiteSummary)]) -> Table {
    let mut table = new_table(&[
        "col.scope",
        "col.records",
        "col.cost_leakage",
        "col.loss_rate",
        "col.utilization",
        "col.worst",
        "col.status",
        "col.driver",
        "col.action",
    ]);

    for (scope, site) in rows {
        table.add_row(vec![
            Cell::new(scope),
            Cell::new(site.record_count),
            Cell::new(fmt_money(site.cost_leakage)),
            Cell::new(fmt_rate(site.weighted_loss_rate)),
            Cell::new(fmt_rate(site.avg_utilization_rate)),
            classification_cell(site.worst_classification),
            classification_cell(site.status),
            Cell::new(site.dominant_driver.label()),
            Cell::new(&site.recommended_action),
        ]);
    }
    table
}

/// 损耗驱动分布表
pub fn driver_mix_table(mix: &[DriverMixEntry]) -> Table {
    let mut table = new_table(&["col.driver", "col.records", "col.units", "col.share"]);
    for entry in mix {
        table.add_row(vec![
            Cell::new(entry.driver.label()),
            Cell::new(entry.record_count),
            Cell::new(fmt_int(entry.units)),
            Cell::new(fmt_pct(entry.share, 1)),
        ]);
    }
    table
}

/// 日明细表
pub fn daily_table(records: &[ClassifiedRecord]) -> Table {
    let mut table = new_table(&[
        "col.date",
        "col.classification",
        "col.loss_rate",
        "col.utilization",
        "col.cost_leakage",
        "col.driver",
    ]);

    for record in records {
        let mut date = record.kpi.date().to_string();
        if record.kpi.excluded_from_rates() {
            date.push_str(" *");
        }
        table.add_row(vec![
            Cell::new(date),
            classification_cell(record.classification),
            Cell::new(fmt_rate(record.kpi.loss_rate)),
            Cell::new(fmt_rate(record.kpi.utilization_rate)),
            Cell::new(fmt_money(record.kpi.cost_leakage)),
            Cell::new(record.attribution.driver.label()),
        ]);
    }
    table
}

/// 完整控制台摘要
pub fn render_console_summary(output: &PipelineOutput) -> String {
    format!("{}\n{}\n", overall_table(output), risk_table(output))
}
