// ==========================================
// 站点资源运营分析 - 核心库
// ==========================================
// 流水线: 加载 → KPI → 风险分级 + 损耗归因 → 汇总 → 报告 / 驾驶舱
// 各层只读上游输出, 不回写输入记录
// ==========================================

// 语言文件: locales/*.yml, 缺失键回退到英文
rust_i18n::i18n!("locales", fallback = "en");

pub mod api; // 报告生成 / 驾驶舱查询
pub mod config; // 阈值, 路径, 数据质量策略
pub mod domain; // 记录, KPI, 分级结果, 汇总
pub mod engine; // KPI / 分级 / 归因 / 汇总
pub mod i18n;
pub mod importer; // CSV / Excel 加载与校验
pub mod logging;
pub mod report; // Markdown 执行报告 + JSON 输出契约

// ==========================================
// 重导出
// ==========================================

pub use domain::types::{DataQualityPolicy, LossDriver, RiskClassification};
pub use domain::{
    ClassifiedRecord, Dataset, KpiRecord, LossDriverAttribution, PipelineOutput,
    PortfolioSummary, RateValue, SiteAttributes, SiteDayRecord, SiteMaster, SiteSummary,
};

pub use config::{ConfigManager, RiskThresholds};
pub use engine::{
    ActionTable, Aggregator, KpiEngine, LossDriverAttributor, PipelineOrchestrator,
    RiskClassifier,
};
pub use importer::RecordLoader;
pub use api::{ApiError, DashboardApi, ReportApi};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "site-resource-ops";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "site-resource-ops");
    }
}
