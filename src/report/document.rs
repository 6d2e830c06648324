// ==========================================
// 站点资源运营分析 - 报告文档模型
// ==========================================
// 输出契约 → 与格式无关的块序列, Markdown / PDF 渲染器共用
// 章节: 标题 → 数据质量告警 → 执行摘要 → 整体 KPI → 站点风险与建议
//       → 成本泄漏排名 → 趋势 → 损耗驱动分布 → 异常 → 配置附录
// 红线: 只读取输出契约, 不重算 KPI; 不含时间戳 (同输入同输出)
// ==========================================

use crate::domain::summary::{PipelineOutput, SiteSummary};
use crate::engine::aggregator::compare_cost_leakage;
use crate::i18n::{t, t_with_args};
use crate::report::format::{fmt_int, fmt_money, fmt_pct, fmt_rate};

/// 文档块
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Subtitle(String),
    Paragraph(String),
    Warning { label: String, text: String },
    Heading(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Code(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    /// 由输出契约构建执行报告
    ///
    /// # 参数
    /// - top_n_sites: 成本泄漏排名条目数
    /// - config_snapshot: 生效配置 JSON, 存在时写入附录
    pub fn build(
        output: &PipelineOutput,
        top_n_sites: usize,
        config_snapshot: Option<&str>,
    ) -> Self {
        let mut doc = ReportDocument::default();
        let portfolio = &output.portfolio;
        let o = &portfolio.overall;

        // ===== 标题 =====
        doc.push(Block::Title(t("report.title")));
        doc.push(Block::Subtitle(t("report.subtitle")));
        doc.push(Block::Paragraph(t_with_args(
            "report.window",
            &[
                ("start", &portfolio.window_start.to_string()),
                ("end", &portfolio.window_end.to_string()),
            ],
        )));

        // ===== 数据质量告警 =====
        if !portfolio.data_quality_sites.is_empty() {
            let sites: Vec<&str> = portfolio
                .data_quality_sites
                .iter()
                .map(|s| s.site_id.as_str())
                .collect();
            doc.push(Block::Warning {
                label: t("report.warning"),
                text: t_with_args(
                    "report.dq_banner",
                    &[
                        ("count", &sites.len().to_string()),
                        ("sites", &sites.join(", ")),
                    ],
                ),
            });
        }

        // ===== 执行摘要 =====
        doc.heading("report.exec_summary");
        doc.push(Block::Paragraph(t_with_args(
            "report.exec_text",
            &[
                ("actual", &fmt_int(o.actual_units)),
                ("disposed", &fmt_int(o.disposed_units)),
                ("cost", &fmt_money(o.cost_leakage)),
                ("utilization", &fmt_rate(o.avg_utilization_rate)),
                ("loss", &fmt_rate(o.avg_loss_rate)),
                ("shock", &o.shock_days.to_string()),
            ],
        )));

        // ===== 整体 KPI =====
        doc.heading("report.overall_kpis");
        doc.table(
            &["report.metric", "report.value"],
            vec![
                vec![t("metric.sites"), o.site_count.to_string()],
                vec![t("metric.records"), o.record_count.to_string()],
                vec![t("metric.excluded_records"), o.excluded_record_count.to_string()],
                vec![t("metric.planned_units"), fmt_int(o.planned_units)],
                vec![t("metric.actual_units"), fmt_int(o.actual_units)],
                vec![t("metric.usable_units"), fmt_int(o.usable_units)],
                vec![t("metric.disposed_units"), fmt_int(o.disposed_units)],
                vec![t("metric.cost_leakage"), fmt_money(o.cost_leakage)],
                vec![t("metric.avg_unit_cost"), fmt_money(o.avg_unit_cost)],
                vec![t("metric.avg_loss_rate"), fmt_rate(o.avg_loss_rate)],
                vec![t("metric.avg_utilization"), fmt_rate(o.avg_utilization_rate)],
                vec![t("metric.shock_days"), o.shock_days.to_string()],
            ],
        );

        // ===== 站点风险与建议动作 =====
        doc.heading("report.site_risk");
        let risk_rows = portfolio
            .top_risk_sites
            .iter()
            .filter_map(|ranked| output.site(&ranked.site_id).map(|s| (ranked.rank, s)))
            .map(|(rank, s)| {
                vec![
                    rank.to_string(),
                    s.site_id.clone(),
                    s.worst_classification.label(),
                    s.status.label(),
                    fmt_rate(s.weighted_loss_rate),
                    fmt_money(s.cost_leakage),
                    s.dominant_driver.label(),
                    fmt_pct(s.dominant_driver_share, 1),
                    s.recommended_action.clone(),
                ]
            })
            .collect();
        doc.table(
            &[
                "col.rank",
                "col.site_id",
                "col.worst",
                "col.status",
                "col.loss_rate",
                "col.cost_leakage",
                "col.driver",
                "col.share",
                "col.action",
            ],
            risk_rows,
        );

        // ===== 成本泄漏排名 =====
        doc.heading("report.top_cost");
        let mut by_cost: Vec<&SiteSummary> = output.sites.iter().collect();
        by_cost.sort_by(|a, b| compare_cost_leakage(a, b));
        let cost_rows = by_cost
            .iter()
            .take(top_n_sites)
            .map(|s| {
                vec![
                    s.site_id.clone(),
                    fmt_money(s.cost_leakage),
                    fmt_int(s.disposed_units),
                    s.record_count.to_string(),
                ]
            })
            .collect();
        doc.table(
            &["col.site_id", "col.cost_leakage", "metric.disposed_units", "col.records"],
            cost_rows,
        );

        // ===== 趋势 =====
        doc.heading("report.trend");
        let trend_rows = portfolio
            .trend
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    fmt_money(p.cost_leakage),
                    fmt_rate(p.loss_rate),
                    p.record_count.to_string(),
                ]
            })
            .collect();
        doc.table(
            &["col.date", "col.cost_leakage", "col.loss_rate", "col.records"],
            trend_rows,
        );

        // ===== 损耗驱动分布 =====
        doc.heading("report.driver_mix");
        let mix_rows = portfolio
            .driver_mix
            .iter()
            .map(|m| {
                vec![
                    m.driver.label(),
                    m.record_count.to_string(),
                    fmt_int(m.units),
                    fmt_pct(m.share, 1),
                ]
            })
            .collect();
        doc.table(&["col.driver", "col.records", "col.units", "col.share"], mix_rows);

        // ===== 异常 =====
        doc.heading("report.anomalies");
        if portfolio.anomalies.is_empty() {
            doc.push(Block::Paragraph(t("report.no_anomalies")));
        } else {
            let anomaly_rows = portfolio
                .anomalies
                .iter()
                .map(|a| {
                    vec![
                        a.date.to_string(),
                        a.site_id.clone(),
                        fmt_money(a.cost_leakage),
                        format!("{:.2}", a.zscore),
                    ]
                })
                .collect();
            doc.table(
                &["col.date", "col.site_id", "col.cost_leakage", "col.zscore"],
                anomaly_rows,
            );
        }

        // ===== 配置附录 =====
        if let Some(snapshot) = config_snapshot {
            doc.heading("report.config");
            doc.push(Block::Code(snapshot.to_string()));
        }

        doc
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn heading(&mut self, key: &str) {
        self.push(Block::Heading(t(key)));
    }

    fn table(&mut self, header_keys: &[&str], rows: Vec<Vec<String>>) {
        self.push(Block::Table {
            headers: header_keys.iter().map(|key| t(key)).collect(),
            rows,
        });
    }

    /// 章节标题 (按出现顺序)
    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
