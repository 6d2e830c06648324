// ==========================================
// 站点资源运营分析 - 驾驶舱 API
// ==========================================
// 职责: 基于输出契约的交互式查询
// - 站点 / 日期筛选 (对子集重新运行流水线)
// - 站点下钻 (日趋势 + 站点驱动分布 + 全量站点汇总)
// - 成本泄漏排名、数据质量告警横幅
// 红线: 排序复用核心排名比较器, 不另立口径
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::risk::ClassifiedRecord;
use crate::domain::site::Dataset;
use crate::domain::summary::{DriverMixEntry, PipelineOutput, RankedSite, SiteSummary};
use crate::engine::aggregator::{compare_cost_leakage, compare_risk_rank, driver_mix, rank_sites};
use crate::engine::orchestrator::PipelineOrchestrator;
use crate::i18n::{t, t_with_args};
use crate::report::console::{
    cost_table, daily_table, driver_mix_table, overall_table, site_table, summary_table,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 驾驶舱成本泄漏排名条目数
pub const TOP_COST_SITES: usize = 10;

// ==========================================
// 请求 / 响应
// ==========================================

/// 站点列表排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteSort {
    #[default]
    RiskRank,
    CostLeakage,
}

/// 驾驶舱筛选条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilter {
    pub sites: Vec<String>, // 为空表示全部站点
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: SiteSort,
}

/// 驾驶舱视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub filter: DashboardFilter,
    pub warning_banner: Option<String>, // 数据质量告警
    pub flagged_sites: Vec<String>,
    pub top_cost_sites: Vec<RankedSite>,
    pub sites: Vec<SiteSummary>, // 按 filter.sort 排序
    pub output: PipelineOutput,  // 子集上的输出契约
}

/// 站点下钻视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDrilldown {
    pub site_id: String,
    pub summary_all_data: SiteSummary,          // 全量数据上的站点汇总
    pub summary_filtered: Option<SiteSummary>,  // 筛选窗口内的站点汇总
    pub daily: Vec<ClassifiedRecord>,           // 窗口内按日期排序
    pub driver_mix: Vec<DriverMixEntry>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    dataset: Dataset,
    orchestrator: PipelineOrchestrator,
    full: PipelineOutput,
}

impl DashboardApi {
    /// 创建驾驶舱 API (先对全量数据运行一次流水线)
    pub fn new(dataset: Dataset, orchestrator: PipelineOrchestrator) -> ApiResult<Self> {
        let full = orchestrator.run(&dataset)?;
        info!(
            sites = full.sites.len(),
            records = full.records.len(),
            "驾驶舱数据就绪"
        );

        Ok(Self {
            dataset,
            orchestrator,
            full,
        })
    }

    /// 全量输出契约
    pub fn full_output(&self) -> &PipelineOutput {
        &self.full
    }

    /// 可选站点
    pub fn site_ids(&self) -> Vec<String> {
        self.dataset.site_ids()
    }

    /// 数据日期范围
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.dataset.date_bounds()
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按筛选条件查询
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 日期范围倒置
    /// - Err(ApiError::NotFound): 指定站点不存在
    /// - Err(ApiError::EmptyInput): 筛选后没有记录
    pub fn query(&self, filter: &DashboardFilter) -> ApiResult<DashboardView> {
        let output = self.run_filtered(filter)?;

        let mut sites = output.sites.clone();
        match filter.sort {
            SiteSort::RiskRank => sites.sort_by(compare_risk_rank),
            SiteSort::CostLeakage => sites.sort_by(compare_cost_leakage),
        }

        let mut by_cost = output.sites.clone();
        by_cost.sort_by(compare_cost_leakage);
        let top_cost_sites = rank_sites(&by_cost, TOP_COST_SITES);

        let flagged_sites: Vec<String> = output
            .portfolio
            .data_quality_sites
            .iter()
            .map(|s| s.site_id.clone())
            .collect();
        let warning_banner = warning_banner(&flagged_sites);

        debug!(
            sites = sites.len(),
            flagged = flagged_sites.len(),
            "驾驶舱查询完成"
        );

        Ok(DashboardView {
            filter: filter.clone(),
            warning_banner,
            flagged_sites,
            top_cost_sites,
            sites,
            output,
        })
    }

    /// 站点下钻
    pub fn drilldown(&self, site_id: &str, filter: &DashboardFilter) -> ApiResult<SiteDrilldown> {
        let summary_all_data = self
            .full
            .site(site_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(site_id.to_string()))?;

        let site_filter = DashboardFilter {
            sites: vec![site_id.to_string()],
            ..filter.clone()
        };

        // 窗口内无记录时仍返回全量汇总
        let windowed = match self.run_filtered(&site_filter) {
            Ok(output) => Some(output),
            Err(ApiError::EmptyInput) => None,
            Err(e) => return Err(e),
        };

        let (summary_filtered, mut daily) = match windowed {
            Some(output) => (output.site(site_id).cloned(), output.records),
            None => (None, Vec::new()),
        };
        daily.sort_by_key(|r| r.kpi.date());

        Ok(SiteDrilldown {
            site_id: site_id.to_string(),
            summary_all_data,
            summary_filtered,
            driver_mix: driver_mix(&daily),
            daily,
        })
    }

    fn run_filtered(&self, filter: &DashboardFilter) -> ApiResult<PipelineOutput> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(ApiError::InvalidInput(format!(
                    "日期范围无效: {} > {}",
                    from, to
                )));
            }
        }

        if let Some(unknown) = filter
            .sites
            .iter()
            .find(|s| self.full.site(s).is_none())
        {
            return Err(ApiError::NotFound(unknown.clone()));
        }

        let subset = self
            .dataset
            .filtered(&filter.sites, filter.date_from, filter.date_to);
        Ok(self.orchestrator.run(&subset)?)
    }
}

// ==========================================
// 控制台渲染
// ==========================================

impl DashboardView {
    /// 控制台文本: 告警横幅 → 整体 KPI → 站点列表 (按 filter.sort) → 成本泄漏排名
    pub fn render_console(&self) -> String {
        let heading = match self.filter.sort {
            SiteSort::RiskRank => t("cli.sites_by_risk"),
            SiteSort::CostLeakage => t("cli.sites_by_cost"),
        };

        let mut sections = Vec::new();
        if let Some(banner) = &self.warning_banner {
            sections.push(format!("! {}", banner));
        }
        sections.push(overall_table(&self.output).to_string());
        sections.push(heading);
        sections.push(site_table(&self.sites).to_string());
        sections.push(t("report.top_cost"));
        sections.push(cost_table(&self.top_cost_sites).to_string());
        sections.join("\n") + "\n"
    }
}

impl SiteDrilldown {
    /// 控制台文本: 全量 / 窗口汇总对照 → 窗口驱动分布 → 日明细
    pub fn render_console(&self) -> String {
        let mut rows = vec![(t("cli.drill_all_data"), &self.summary_all_data)];
        if let Some(filtered) = &self.summary_filtered {
            rows.push((t("cli.drill_filtered"), filtered));
        }

        let mut sections = vec![
            t_with_args("cli.drilldown", &[("site", &self.site_id)]),
            summary_table(&rows).to_string(),
        ];

        if self.daily.is_empty() {
            sections.push(t("cli.drill_empty"));
        } else {
            sections.push(t("cli.drill_mix"));
            sections.push(driver_mix_table(&self.driver_mix).to_string());
            sections.push(t("cli.drill_daily"));
            sections.push(daily_table(&self.daily).to_string());
        }
        sections.join("\n") + "\n"
    }
}

/// 数据质量告警横幅 (无标记站点时为 None)
pub fn warning_banner(flagged_sites: &[String]) -> Option<String> {
    if flagged_sites.is_empty() {
        return None;
    }
    Some(t_with_args(
        "report.dq_banner",
        &[
            ("count", &flagged_sites.len().to_string()),
            ("sites", &flagged_sites.join(", ")),
        ],
    ))
}
