// ==========================================
// 站点资源运营分析 - 风险与损耗归因领域模型
// ==========================================
// 职责: 损耗归因结果 / 已分级记录
// ==========================================

use crate::domain::kpi::KpiRecord;
use crate::domain::types::{LossDriver, RiskClassification};
use serde::{Deserialize, Serialize};

// ==========================================
// DriverMagnitude - 单个驱动分量
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverMagnitude {
    pub driver: LossDriver,
    pub units: f64,
}

// ==========================================
// LossDriverAttribution - 损耗归因
// ==========================================
// 用途: 主导驱动 + 建议动作 (可解释性)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossDriverAttribution {
    pub driver: LossDriver,          // 主导驱动
    pub dominant_units: f64,         // 主导分量 (单位数)
    pub total_units: f64,            // 全部分量合计
    pub share: f64,                  // 主导占比 (合计为 0 时为 0)
    pub recommended_action: String,  // 建议动作
    pub components: Vec<DriverMagnitude>, // 各分量 (按优先顺序)
}

// ==========================================
// ClassifiedRecord - 已分级记录
// ==========================================
// KPI 记录 + 风险分级 + 损耗归因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub kpi: KpiRecord,
    pub classification: RiskClassification,
    pub attribution: LossDriverAttribution,
}

impl ClassifiedRecord {
    pub fn site_id(&self) -> &str {
        self.kpi.site_id()
    }
}
