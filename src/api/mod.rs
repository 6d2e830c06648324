// ==========================================
// 站点资源运营分析 - API 层
// ==========================================
// 职责: 提供报告生成与驾驶舱查询接口, 供 CLI 调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod report_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardFilter, DashboardView, SiteDrilldown, SiteSort};
pub use error::{ApiError, ApiResult};
pub use report_api::{ReportApi, ReportOutcome};
