// ==========================================
// 站点资源运营分析 - KPI 引擎
// ==========================================
// 职责: 单条站点日记录 → KPI 记录
// 输入: SiteDayRecord
// 输出: KpiRecord (利用率 / 损耗率 / 成本泄漏 + 数据质量标记)
// 红线: 比率超出 [0,1] 只标记不截断; 分母为 0 不得 panic
// ==========================================

use crate::domain::kpi::{DataQualityIssue, KpiRecord, RateValue};
use crate::domain::site::SiteDayRecord;
use crate::domain::types::DataQualityPolicy;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, warn};

// ==========================================
// KpiEngine - KPI 引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct KpiEngine {
    policy: DataQualityPolicy,
}

impl KpiEngine {
    pub fn new(policy: DataQualityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DataQualityPolicy {
        self.policy
    }

    /// 计算单条记录的 KPI
    ///
    /// # 返回
    /// - Ok(KpiRecord): 正常或已标记数据质量问题
    /// - Err(EngineError::DataQuality): 仅在 FailFast 策略下遇到数据质量错误
    pub fn compute_kpis(&self, record: &SiteDayRecord) -> EngineResult<KpiRecord> {
        let kpi = compute_kpis(record);

        if self.policy == DataQualityPolicy::FailFast {
            if let Some(issue) = kpi.data_quality.iter().find(|i| i.is_error()) {
                return Err(EngineError::DataQuality {
                    record_key: record.record_key(),
                    issue: issue.clone(),
                });
            }
        }

        Ok(kpi)
    }

    /// 批量计算 (保持输入顺序)
    pub fn compute_all(&self, records: &[SiteDayRecord]) -> EngineResult<Vec<KpiRecord>> {
        records.iter().map(|r| self.compute_kpis(r)).collect()
    }
}

/// 计算单条记录的 KPI (标记并继续)
pub fn compute_kpis(record: &SiteDayRecord) -> KpiRecord {
    let mut data_quality = Vec::new();

    // 1. 负数检查
    let quantities = [
        ("planned_units", Some(record.planned_units)),
        ("actual_units", Some(record.actual_units)),
        ("disposed_units", Some(record.disposed_units)),
        ("unit_cost", Some(record.unit_cost)),
        ("usable_units", record.usable_units),
    ];
    for (field, value) in quantities {
        if let Some(v) = value.filter(|v| *v < 0.0) {
            data_quality.push(DataQualityIssue::NegativeQuantity {
                field: field.to_string(),
                value: v,
            });
        }
    }

    // 2. 比率
    let utilization_rate = RateValue::ratio(record.actual_units, record.planned_units);
    let loss_rate = RateValue::ratio(record.disposed_units, record.planned_units);

    if record.planned_units == 0.0 {
        data_quality.push(DataQualityIssue::DivisionUndefined);
    }

    for (field, rate) in [("utilization_rate", utilization_rate), ("loss_rate", loss_rate)] {
        if let RateValue::Defined(v) = rate {
            if !(0.0..=1.0).contains(&v) {
                data_quality.push(DataQualityIssue::OutOfRange {
                    field: field.to_string(),
                    value: v,
                });
            }
        }
    }

    // 3. 成本泄漏 (始终计算)
    let cost_leakage = record.disposed_units * record.unit_cost;

    for issue in &data_quality {
        if issue.is_error() {
            warn!(record = %record.record_key(), row = record.row_number, %issue, "数据质量问题");
        } else {
            debug!(record = %record.record_key(), %issue, "比率未定义");
        }
    }

    KpiRecord {
        record: record.clone(),
        utilization_rate,
        loss_rate,
        cost_leakage,
        data_quality,
    }
}
