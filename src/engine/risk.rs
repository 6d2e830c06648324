// ==========================================
// 站点资源运营分析 - 风险分级引擎
// ==========================================
// 职责: KPI 记录 → 风险分级 (Normal / Watch / InterventionRequired)
// 输入: KpiRecord + RiskThresholds
// 输出: RiskClassification
// ==========================================
// 规则 (按优先级, 命中即返回):
// 1. 损耗率 >= intervention_loss_rate 或 成本泄漏 >= intervention_cost_leakage
//    → InterventionRequired
// 2. 损耗率 >= watch_loss_rate 或 利用率 <= watch_utilization_floor → Watch
// 3. 其他 → Normal
// 未定义比率不命中任何比率规则, 成本规则照常生效
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::thresholds::RiskThresholds;
use crate::domain::kpi::{KpiRecord, RateValue};
use crate::domain::types::RiskClassification;

// ==========================================
// RiskClassifier - 风险分级引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    /// 构造函数 (阈值先校验)
    ///
    /// # 返回
    /// - Err(ConfigError): 阈值非法或不单调, 在任何分级之前失败
    pub fn new(thresholds: RiskThresholds) -> ConfigResult<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// 日记录分级
    pub fn classify(&self, kpi: &KpiRecord) -> RiskClassification {
        classify(kpi, &self.thresholds)
    }

    /// 站点级状态 (加权损耗率 + 累计成本泄漏)
    pub fn classify_site(
        &self,
        weighted_loss_rate: RateValue,
        cumulative_cost_leakage: f64,
    ) -> RiskClassification {
        let t = &self.thresholds;
        let loss = weighted_loss_rate.value();

        if loss.map_or(false, |v| v >= t.intervention_loss_rate)
            || cumulative_cost_leakage >= t.intervention_site_cost_leakage
        {
            return RiskClassification::InterventionRequired;
        }

        if loss.map_or(false, |v| v >= t.watch_loss_rate)
            || cumulative_cost_leakage >= t.watch_site_cost_leakage
        {
            return RiskClassification::Watch;
        }

        RiskClassification::Normal
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
        }
    }
}

/// 日记录分级 (纯函数)
pub fn classify(kpi: &KpiRecord, thresholds: &RiskThresholds) -> RiskClassification {
    let loss = kpi.loss_rate.value();
    let utilization = kpi.utilization_rate.value();

    // 规则 1: 需要干预
    if loss.map_or(false, |v| v >= thresholds.intervention_loss_rate)
        || kpi.cost_leakage >= thresholds.intervention_cost_leakage
    {
        return RiskClassification::InterventionRequired;
    }

    // 规则 2: 关注
    if loss.map_or(false, |v| v >= thresholds.watch_loss_rate)
        || utilization.map_or(false, |v| v <= thresholds.watch_utilization_floor)
    {
        return RiskClassification::Watch;
    }

    RiskClassification::Normal
}
