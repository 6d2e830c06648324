// ==========================================
// 站点资源运营分析 - 损耗归因引擎
// ==========================================
// 职责: KPI 记录 → 主导损耗驱动 + 建议动作
// 分量 (单位数):
// - Overproduction = disposed (原因为 overproduction 时)
// - TimingMismatch = max(planned - actual, 0) + disposed (原因为 timing_mismatch 时)
// - Spoilage       = disposed (原因为 spoilage 时)
// - Damage         = disposed (原因为 damage 时)
// 最大分量胜出; 完全相等时按 LossDriver::PRECEDENCE 裁决
// actual > planned 的超量已由 KPI 引擎标记为 OutOfRange, 不再折算为驱动分量
// 红线: 建议动作来自动作表 (数据), 不在代码中分支
// ==========================================

use crate::domain::kpi::KpiRecord;
use crate::domain::risk::{DriverMagnitude, LossDriverAttribution};
use crate::domain::types::LossDriver;
use crate::i18n::t;
use std::collections::BTreeMap;

// ==========================================
// ActionTable - 驱动 → 建议动作
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTable {
    actions: BTreeMap<LossDriver, String>,
}

impl ActionTable {
    /// 使用当前语言的默认动作文本
    pub fn from_locale() -> Self {
        LossDriver::PRECEDENCE
            .into_iter()
            .map(|d| (d, t(&format!("actions.{}", d.code()))))
            .collect()
    }

    /// 叠加配置覆写
    pub fn with_overrides(mut self, overrides: BTreeMap<LossDriver, String>) -> Self {
        self.actions.extend(overrides);
        self
    }

    pub fn action_for(&self, driver: LossDriver) -> &str {
        self.actions.get(&driver).map(String::as_str).unwrap_or_default()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::from_locale()
    }
}

impl FromIterator<(LossDriver, String)> for ActionTable {
    fn from_iter<I: IntoIterator<Item = (LossDriver, String)>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

// ==========================================
// LossDriverAttributor - 损耗归因引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LossDriverAttributor {
    actions: ActionTable,
}

impl LossDriverAttributor {
    pub fn new(actions: ActionTable) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// 单条记录归因
    pub fn attribute(&self, kpi: &KpiRecord) -> LossDriverAttribution {
        attribute(kpi, &self.actions)
    }

    /// 对已汇总的分量归因 (站点窗口级)
    pub fn attribute_components(&self, components: Vec<DriverMagnitude>) -> LossDriverAttribution {
        from_components(components, &self.actions)
    }
}

/// 单条记录归因 (纯函数)
pub fn attribute(kpi: &KpiRecord, actions: &ActionTable) -> LossDriverAttribution {
    from_components(driver_components(kpi), actions)
}

/// 计算各驱动分量 (按优先顺序)
pub fn driver_components(kpi: &KpiRecord) -> Vec<DriverMagnitude> {
    let r = &kpi.record;
    let reported = |driver: LossDriver| {
        if r.loss_reason == Some(driver) {
            r.disposed_units
        } else {
            0.0
        }
    };

    LossDriver::PRECEDENCE
        .into_iter()
        .map(|driver| {
            let shortfall = match driver {
                LossDriver::TimingMismatch => (r.planned_units - r.actual_units).max(0.0),
                _ => 0.0,
            };
            DriverMagnitude {
                driver,
                units: shortfall + reported(driver),
            }
        })
        .collect()
}

/// 选出主导驱动: 严格更大才替换, 并列保留优先级靠前者
pub fn dominant(components: &[DriverMagnitude]) -> DriverMagnitude {
    let mut best = DriverMagnitude {
        driver: LossDriver::PRECEDENCE[0],
        units: f64::NEG_INFINITY,
    };

    for driver in LossDriver::PRECEDENCE {
        let units = components
            .iter()
            .filter(|c| c.driver == driver)
            .map(|c| c.units)
            .sum::<f64>();
        if units > best.units {
            best = DriverMagnitude { driver, units };
        }
    }

    best
}

fn from_components(components: Vec<DriverMagnitude>, actions: &ActionTable) -> LossDriverAttribution {
    let best = dominant(&components);
    let total_units: f64 = components.iter().map(|c| c.units).sum();
    let share = if total_units > 0.0 {
        best.units / total_units
    } else {
        0.0
    };

    LossDriverAttribution {
        driver: best.driver,
        dominant_units: best.units,
        total_units,
        share,
        recommended_action: actions.action_for(best.driver).to_string(),
        components,
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::site::SiteDayRecord;
    use crate::engine::kpi::compute_kpis;
    use chrono::NaiveDate;

    fn kpi(planned: f64, actual: f64, disposed: f64, reason: Option<LossDriver>) -> KpiRecord {
        compute_kpis(&SiteDayRecord {
            site_id: "S1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            planned_units: planned,
            actual_units: actual,
            disposed_units: disposed,
            unit_cost: 1.0,
            usable_units: None,
            loss_reason: reason,
            staffing_shortfall: false,
            supplier_delay: false,
            temp_excursion: false,
            row_number: 2,
        })
    }

    fn table() -> ActionTable {
        LossDriver::PRECEDENCE
            .into_iter()
            .map(|d| (d, format!("fix {}", d.code())))
            .collect()
    }

    #[test]
    fn test_reported_reason_dominates() {
        let attribution = attribute(&kpi(100.0, 98.0, 10.0, Some(LossDriver::Spoilage)), &table());
        assert_eq!(attribution.driver, LossDriver::Spoilage);
        assert_eq!(attribution.dominant_units, 10.0);
        assert_eq!(attribution.total_units, 12.0);
        assert_eq!(attribution.recommended_action, "fix spoilage");
    }

    #[test]
    fn test_gap_dominates() {
        let attribution = attribute(&kpi(100.0, 60.0, 10.0, Some(LossDriver::Damage)), &table());
        assert_eq!(attribution.driver, LossDriver::TimingMismatch);
        assert_eq!(attribution.dominant_units, 40.0);
        assert!((attribution.share - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_overproduction_from_reported_reason() {
        let attribution = attribute(
            &kpi(100.0, 100.0, 6.0, Some(LossDriver::Overproduction)),
            &table(),
        );
        assert_eq!(attribution.driver, LossDriver::Overproduction);
        assert_eq!(attribution.dominant_units, 6.0);
        assert_eq!(attribution.share, 1.0);
    }

    #[test]
    fn test_overrun_gap_is_not_a_component() {
        // 超量部分只作为数据质量问题出现
        let record = kpi(100.0, 130.0, 3.0, None);
        assert!(record.has_data_quality_error());

        let components = driver_components(&record);
        assert!(components.iter().all(|c| c.units == 0.0));

        let attribution = attribute(&record, &table());
        assert_eq!(attribution.total_units, 0.0);
        assert_eq!(attribution.share, 0.0);
    }

    #[test]
    fn test_tie_resolved_by_precedence() {
        // TimingMismatch = 5, Spoilage = 5
        let attribution = attribute(&kpi(100.0, 95.0, 5.0, Some(LossDriver::Spoilage)), &table());
        assert_eq!(attribution.driver, LossDriver::TimingMismatch);
        assert_eq!(attribution.share, 0.5);
    }

    #[test]
    fn test_all_zero_uses_first_precedence() {
        let attribution = attribute(&kpi(100.0, 100.0, 0.0, None), &table());
        assert_eq!(attribution.driver, LossDriver::Overproduction);
        assert_eq!(attribution.total_units, 0.0);
        assert_eq!(attribution.share, 0.0);
    }

    #[test]
    fn test_action_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(LossDriver::Damage, "Inspect handling".to_string());
        let actions = table().with_overrides(overrides);
        assert_eq!(actions.action_for(LossDriver::Damage), "Inspect handling");
        assert_eq!(actions.action_for(LossDriver::Spoilage), "fix spoilage");
    }

    #[test]
    fn test_attribute_components_sums_window() {
        let attributor = LossDriverAttributor::new(table());
        let attribution = attributor.attribute_components(vec![
            DriverMagnitude { driver: LossDriver::Spoilage, units: 4.0 },
            DriverMagnitude { driver: LossDriver::Damage, units: 3.0 },
            DriverMagnitude { driver: LossDriver::Damage, units: 3.0 },
        ]);
        assert_eq!(attribution.driver, LossDriver::Damage);
        assert_eq!(attribution.dominant_units, 6.0);
        assert_eq!(attribution.total_units, 10.0);
    }
}
