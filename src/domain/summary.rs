// ==========================================
// 站点资源运营分析 - 汇总领域模型
// ==========================================
// 职责: 站点汇总 / 组合汇总 / 流水线输出契约
// 用途: 报告渲染与驾驶舱只读数据源, 不再重算任何 KPI
// ==========================================

use crate::domain::kpi::RateValue;
use crate::domain::risk::ClassifiedRecord;
use crate::domain::site::SiteAttributes;
use crate::domain::types::{LossDriver, RiskClassification};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SiteSummary - 站点汇总 (报告窗口)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    pub site_id: String,
    pub attributes: Option<SiteAttributes>, // 站点主数据 (缺失时为 None)

    // ===== 记录计数 =====
    pub record_count: usize,         // 全部记录
    pub rate_record_count: usize,    // 参与比率聚合的记录
    pub flagged_record_count: usize, // 带数据质量问题的记录
    pub shock_days: usize,           // 出现运营冲击的天数

    // ===== 绝对量合计 (含排除记录) =====
    pub planned_units: f64,
    pub actual_units: f64,
    pub disposed_units: f64,
    pub cost_leakage: f64,           // 累计成本泄漏

    // ===== 比率 (仅参与比率聚合的记录) =====
    pub avg_utilization_rate: RateValue,
    pub avg_loss_rate: RateValue,
    pub weighted_loss_rate: RateValue, // Σdisposed / Σplanned

    // ===== 风险 =====
    pub worst_classification: RiskClassification, // 窗口内最严重日分级
    pub status: RiskClassification,               // 站点级状态 (加权损耗率 + 累计泄漏)

    // ===== 损耗归因 =====
    pub dominant_driver: LossDriver,
    pub dominant_driver_share: f64,
    pub recommended_action: String,
}

// ==========================================
// OverallKpis - 组合整体 KPI
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallKpis {
    pub site_count: usize,
    pub record_count: usize,
    pub excluded_record_count: usize,
    pub planned_units: f64,
    pub actual_units: f64,
    pub usable_units: f64,
    pub disposed_units: f64,
    pub cost_leakage: f64,
    pub avg_unit_cost: f64,
    pub avg_loss_rate: RateValue,
    pub avg_utilization_rate: RateValue,
    pub shock_days: usize,
}

// ==========================================
// RankedSite - 高风险站点排名条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSite {
    pub rank: usize, // 从 1 开始
    pub site_id: String,
    pub worst_classification: RiskClassification,
    pub cost_leakage: f64,
    pub status: RiskClassification,
    pub dominant_driver: LossDriver,
    pub recommended_action: String,
}

// ==========================================
// TrendPoint - 趋势序列点 (按日)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub cost_leakage: f64,   // 当日合计
    pub loss_rate: RateValue, // 当日均值 (仅参与比率聚合的记录)
    pub record_count: usize,
}

// ==========================================
// DriverMixEntry - 损耗驱动分布
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverMixEntry {
    pub driver: LossDriver,
    pub record_count: usize, // 以该驱动为主导的记录数
    pub units: f64,          // 该驱动分量合计
    pub share: f64,          // record_count 占比
}

// ==========================================
// CostAnomaly - 成本泄漏异常点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnomaly {
    pub site_id: String,
    pub date: NaiveDate,
    pub cost_leakage: f64,
    pub zscore: f64,
}

// ==========================================
// DataQualitySite - 数据质量告警站点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualitySite {
    pub site_id: String,
    pub flagged_record_count: usize,
    pub record_keys: Vec<String>, // site_id@date
}

// ==========================================
// PortfolioSummary - 组合汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub overall: OverallKpis,
    pub top_risk_sites: Vec<RankedSite>,
    pub trend: Vec<TrendPoint>,
    pub driver_mix: Vec<DriverMixEntry>,
    pub anomalies: Vec<CostAnomaly>,
    pub data_quality_sites: Vec<DataQualitySite>,
}

// ==========================================
// PipelineOutput - 输出契约
// ==========================================
// portfolio + 排名后的站点汇总 + 全部记录 (输入顺序)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub portfolio: PortfolioSummary,
    pub sites: Vec<SiteSummary>,
    pub records: Vec<ClassifiedRecord>,
}

impl PipelineOutput {
    pub fn site(&self, site_id: &str) -> Option<&SiteSummary> {
        self.sites.iter().find(|s| s.site_id == site_id)
    }
}
