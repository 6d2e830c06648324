use crate::config::config_manager::config_keys;
use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// 风险分级阈值（每次运行提供一次, 运行期间只读）
///
/// 配置文件中出现 `thresholds` 段时所有字段必填；
/// 整段缺省时使用 [`RiskThresholds::default`]。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskThresholds {
    /// 日损耗率 >= 该值 → Watch
    pub watch_loss_rate: f64,

    /// 日损耗率 >= 该值 → InterventionRequired
    pub intervention_loss_rate: f64,

    /// 日利用率 <= 该值 → Watch
    pub watch_utilization_floor: f64,

    /// 日成本泄漏 >= 该值 → InterventionRequired
    pub intervention_cost_leakage: f64,

    /// 站点累计成本泄漏 >= 该值 → 站点状态 Watch
    pub watch_site_cost_leakage: f64,

    /// 站点累计成本泄漏 >= 该值 → 站点状态 InterventionRequired
    pub intervention_site_cost_leakage: f64,

    /// 站点内日成本泄漏 z-score >= 该值 → 记为异常
    pub anomaly_zscore_threshold: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            watch_loss_rate: 0.055,
            intervention_loss_rate: 0.085,
            watch_utilization_floor: 0.80,
            intervention_cost_leakage: 2_500.0,
            watch_site_cost_leakage: 25_000.0,
            intervention_site_cost_leakage: 50_000.0,
            anomaly_zscore_threshold: 2.5,
        }
    }
}

impl RiskThresholds {
    /// 校验阈值
    ///
    /// # 规则
    /// - 所有值有限且非负
    /// - 比率类阈值落在 [0, 1]
    /// - watch 阈值不得严于 intervention 阈值
    pub fn validate(&self) -> ConfigResult<()> {
        let values = [
            (config_keys::WATCH_LOSS_RATE, self.watch_loss_rate),
            (config_keys::INTERVENTION_LOSS_RATE, self.intervention_loss_rate),
            (config_keys::WATCH_UTILIZATION_FLOOR, self.watch_utilization_floor),
            (config_keys::INTERVENTION_COST_LEAKAGE, self.intervention_cost_leakage),
            (config_keys::WATCH_SITE_COST_LEAKAGE, self.watch_site_cost_leakage),
            (config_keys::INTERVENTION_SITE_COST_LEAKAGE, self.intervention_site_cost_leakage),
            (config_keys::ANOMALY_ZSCORE_THRESHOLD, self.anomaly_zscore_threshold),
        ];

        for (key, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    message: "必须为有限非负数".to_string(),
                });
            }
        }

        let rates = [
            (config_keys::WATCH_LOSS_RATE, self.watch_loss_rate),
            (config_keys::INTERVENTION_LOSS_RATE, self.intervention_loss_rate),
            (config_keys::WATCH_UTILIZATION_FLOOR, self.watch_utilization_floor),
        ];

        for (key, value) in rates {
            if value > 1.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    message: "比率阈值必须位于 [0, 1]".to_string(),
                });
            }
        }

        check_monotonic(
            config_keys::WATCH_LOSS_RATE,
            self.watch_loss_rate,
            config_keys::INTERVENTION_LOSS_RATE,
            self.intervention_loss_rate,
        )?;
        check_monotonic(
            config_keys::WATCH_SITE_COST_LEAKAGE,
            self.watch_site_cost_leakage,
            config_keys::INTERVENTION_SITE_COST_LEAKAGE,
            self.intervention_site_cost_leakage,
        )?;

        Ok(())
    }
}

fn check_monotonic(
    watch_key: &str,
    watch: f64,
    intervention_key: &str,
    intervention: f64,
) -> ConfigResult<()> {
    if watch > intervention {
        return Err(ConfigError::NonMonotonic {
            watch_key: watch_key.to_string(),
            watch,
            intervention_key: intervention_key.to_string(),
            intervention,
        });
    }
    Ok(())
}
