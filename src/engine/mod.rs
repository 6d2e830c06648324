// ==========================================
// 站点资源运营分析 - 引擎层
// ==========================================
// 职责: KPI 计算 / 风险分级 / 损耗归因 / 汇总
// 红线: 引擎不做 I/O, 所有输入输出均为不可变值
// ==========================================

pub mod aggregator;
pub mod attribution;
pub mod error;
pub mod kpi;
pub mod orchestrator;
pub mod risk;

// 重导出核心引擎
pub use aggregator::{compare_cost_leakage, compare_risk_rank, AggregateOutput, Aggregator};
pub use attribution::{ActionTable, LossDriverAttributor};
pub use error::{EngineError, EngineResult};
pub use kpi::{compute_kpis, KpiEngine};
pub use orchestrator::PipelineOrchestrator;
pub use risk::{classify, RiskClassifier};
