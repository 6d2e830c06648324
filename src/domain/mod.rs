// ==========================================
// 站点资源运营分析 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含加载逻辑,不含引擎逻辑
// ==========================================

pub mod kpi;
pub mod risk;
pub mod site;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use kpi::{DataQualityIssue, KpiRecord, RateValue};
pub use risk::{ClassifiedRecord, DriverMagnitude, LossDriverAttribution};
pub use site::{Dataset, SiteAttributes, SiteDayRecord, SiteMaster};
pub use summary::{
    CostAnomaly, DataQualitySite, DriverMixEntry, OverallKpis, PipelineOutput, PortfolioSummary,
    RankedSite, SiteSummary, TrendPoint,
};
pub use types::{DataQualityPolicy, LossDriver, RiskClassification};
