// ==========================================
// 站点资源运营分析 - KPI 领域模型
// ==========================================
// 职责: 比率值 / 数据质量问题 / KPI 记录
// 红线: 超范围比率只标记, 不截断
// ==========================================

use crate::domain::site::SiteDayRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RateValue - 比率值 (含未定义哨兵)
// ==========================================
// 分母为 0 时为 Undefined, 序列化为 null
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    Defined(f64),
    Undefined,
}

impl RateValue {
    /// 计算比率, 分母为 0 返回 Undefined
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            RateValue::Undefined
        } else {
            RateValue::Defined(numerator / denominator)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            RateValue::Defined(v) => Some(*v),
            RateValue::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, RateValue::Defined(_))
    }

    /// 是否落在 [0, 1]
    pub fn is_within_unit_interval(&self) -> bool {
        match self {
            RateValue::Defined(v) => (0.0..=1.0).contains(v),
            RateValue::Undefined => false,
        }
    }

    /// 算术平均, 空输入返回 Undefined
    pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
            RateValue::Undefined
        } else {
            RateValue::Defined(sum / count as f64)
        }
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::Defined(v) => write!(f, "{:.4}", v),
            RateValue::Undefined => write!(f, "undefined"),
        }
    }
}

// ==========================================
// DataQualityIssue - 单条记录的数据质量问题
// ==========================================
// 非致命: 标记后继续, 记录保留于审计列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQualityIssue {
    /// 计划量为 0, 比率未定义 (告警级)
    DivisionUndefined,
    /// 比率超出 [0, 1]
    OutOfRange { field: String, value: f64 },
    /// 数量/成本为负
    NegativeQuantity { field: String, value: f64 },
}

impl DataQualityIssue {
    /// 是否为数据质量错误 (区别于除零告警)
    pub fn is_error(&self) -> bool {
        !matches!(self, DataQualityIssue::DivisionUndefined)
    }

    /// 问题类别代码
    pub fn category(&self) -> &'static str {
        match self {
            DataQualityIssue::DivisionUndefined => "DivisionUndefinedWarning",
            DataQualityIssue::OutOfRange { .. } | DataQualityIssue::NegativeQuantity { .. } => {
                "DataQualityError"
            }
        }
    }
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityIssue::DivisionUndefined => write!(f, "planned_units = 0, 比率未定义"),
            DataQualityIssue::OutOfRange { field, value } => {
                write!(f, "{} 超出 [0,1]: {:.4}", field, value)
            }
            DataQualityIssue::NegativeQuantity { field, value } => {
                write!(f, "{} 为负数: {}", field, value)
            }
        }
    }
}

// ==========================================
// KpiRecord - KPI 记录
// ==========================================
// SiteDayRecord + 派生指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub record: SiteDayRecord,

    // ===== 派生指标 =====
    pub utilization_rate: RateValue, // actual / planned
    pub loss_rate: RateValue,        // disposed / planned
    pub cost_leakage: f64,           // disposed * unit_cost

    // ===== 数据质量 =====
    pub data_quality: Vec<DataQualityIssue>,
}

impl KpiRecord {
    pub fn site_id(&self) -> &str {
        &self.record.site_id
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    /// 是否排除于比率类聚合 (任何数据质量问题都排除)
    pub fn excluded_from_rates(&self) -> bool {
        !self.data_quality.is_empty()
    }

    /// 是否存在数据质量错误 (不含除零告警)
    pub fn has_data_quality_error(&self) -> bool {
        self.data_quality.iter().any(|issue| issue.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(RateValue::ratio(5.0, 0.0), RateValue::Undefined);
        assert_eq!(RateValue::ratio(60.0, 100.0), RateValue::Defined(0.6));
    }

    #[test]
    fn test_unit_interval() {
        assert!(RateValue::Defined(0.0).is_within_unit_interval());
        assert!(RateValue::Defined(1.0).is_within_unit_interval());
        assert!(!RateValue::Defined(1.01).is_within_unit_interval());
        assert!(!RateValue::Defined(-0.01).is_within_unit_interval());
        assert!(!RateValue::Undefined.is_within_unit_interval());
    }

    #[test]
    fn test_mean() {
        assert_eq!(RateValue::mean(Vec::<f64>::new()), RateValue::Undefined);
        assert_eq!(RateValue::mean(vec![0.25, 0.75]), RateValue::Defined(0.5));
    }

    #[test]
    fn test_rate_value_serde() {
        assert_eq!(serde_json::to_string(&RateValue::Undefined).unwrap(), "null");
        assert_eq!(serde_json::to_string(&RateValue::Defined(0.5)).unwrap(), "0.5");

        let parsed: RateValue = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, RateValue::Undefined);
    }

    #[test]
    fn test_issue_category() {
        assert!(!DataQualityIssue::DivisionUndefined.is_error());
        let issue = DataQualityIssue::OutOfRange {
            field: "loss_rate".to_string(),
            value: 1.5,
        };
        assert!(issue.is_error());
        assert_eq!(issue.category(), "DataQualityError");
    }
}
