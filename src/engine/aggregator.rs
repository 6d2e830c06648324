// ==========================================
// 站点资源运营分析 - 汇总引擎
// ==========================================
// 职责: 已分级记录 → 站点汇总 + 组合汇总
// 输入: ClassifiedRecord 列表 + 站点主数据
// 输出: AggregateOutput (PortfolioSummary + 排名后的 SiteSummary)
// ==========================================
// 排名规则: 最严重分级降序 → 累计成本泄漏降序 → site_id 升序
// 比率聚合与驱动分布仅使用未被数据质量标记的记录;
// 绝对量合计与最严重分级包含全部记录
// ==========================================

use crate::config::thresholds::RiskThresholds;
use crate::domain::kpi::RateValue;
use crate::domain::risk::{ClassifiedRecord, DriverMagnitude};
use crate::domain::site::SiteMaster;
use crate::domain::summary::{
    CostAnomaly, DataQualitySite, DriverMixEntry, OverallKpis, PortfolioSummary, RankedSite,
    SiteSummary, TrendPoint,
};
use crate::domain::types::{LossDriver, RiskClassification};
use crate::engine::attribution::LossDriverAttributor;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::risk::RiskClassifier;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

// ==========================================
// AggregateOutput - 汇总输出
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutput {
    pub portfolio: PortfolioSummary,
    pub sites: Vec<SiteSummary>, // 已按风险排名
}

// ==========================================
// Aggregator - 汇总引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct Aggregator {
    classifier: RiskClassifier,
    attributor: LossDriverAttributor,
    top_n_sites: usize,
}

impl Aggregator {
    pub fn new(
        classifier: RiskClassifier,
        attributor: LossDriverAttributor,
        top_n_sites: usize,
    ) -> Self {
        Self {
            classifier,
            attributor,
            top_n_sites,
        }
    }

    fn thresholds(&self) -> &RiskThresholds {
        self.classifier.thresholds()
    }

    /// 汇总
    ///
    /// # 返回
    /// - Err(EngineError::EmptyInput): 没有任何记录
    pub fn aggregate(
        &self,
        classified: &[ClassifiedRecord],
        site_master: &SiteMaster,
    ) -> EngineResult<AggregateOutput> {
        let (window_start, window_end) = window(classified).ok_or(EngineError::EmptyInput)?;

        // 1. 按站点分组 (BTreeMap 保证遍历顺序确定)
        let mut by_site: BTreeMap<&str, Vec<&ClassifiedRecord>> = BTreeMap::new();
        for record in classified {
            by_site.entry(record.site_id()).or_default().push(record);
        }

        // 2. 站点汇总 + 排名
        let mut sites: Vec<SiteSummary> = by_site
            .iter()
            .map(|(site_id, records)| self.summarize_site(site_id, records, site_master))
            .collect();
        sites.sort_by(compare_risk_rank);

        let top_risk_sites = rank_sites(&sites, self.top_n_sites);

        // 3. 组合汇总
        let portfolio = PortfolioSummary {
            window_start,
            window_end,
            overall: overall_kpis(classified, by_site.len()),
            top_risk_sites,
            trend: trend_series(classified),
            driver_mix: driver_mix(classified),
            anomalies: cost_anomalies(&by_site, self.thresholds().anomaly_zscore_threshold),
            data_quality_sites: data_quality_sites(&by_site),
        };

        info!(
            sites = sites.len(),
            records = classified.len(),
            anomalies = portfolio.anomalies.len(),
            flagged_sites = portfolio.data_quality_sites.len(),
            "汇总完成"
        );

        Ok(AggregateOutput { portfolio, sites })
    }

    /// 站点汇总
    pub fn summarize_site(
        &self,
        site_id: &str,
        records: &[&ClassifiedRecord],
        site_master: &SiteMaster,
    ) -> SiteSummary {
        let included: Vec<&ClassifiedRecord> = records
            .iter()
            .copied()
            .filter(|r| !r.kpi.excluded_from_rates())
            .collect();

        let planned_units: f64 = records.iter().map(|r| r.kpi.record.planned_units).sum();
        let actual_units: f64 = records.iter().map(|r| r.kpi.record.actual_units).sum();
        let disposed_units: f64 = records.iter().map(|r| r.kpi.record.disposed_units).sum();
        let cost_leakage: f64 = records.iter().map(|r| r.kpi.cost_leakage).sum();

        let avg_utilization_rate =
            RateValue::mean(included.iter().filter_map(|r| r.kpi.utilization_rate.value()));
        let avg_loss_rate =
            RateValue::mean(included.iter().filter_map(|r| r.kpi.loss_rate.value()));
        let weighted_loss_rate = RateValue::ratio(
            included.iter().map(|r| r.kpi.record.disposed_units).sum(),
            included.iter().map(|r| r.kpi.record.planned_units).sum(),
        );

        // 最严重分级取全部记录: 数据质量标记只影响比率聚合
        let worst_classification = records
            .iter()
            .map(|r| r.classification)
            .max()
            .unwrap_or(RiskClassification::Normal);

        let status = self.classifier.classify_site(weighted_loss_rate, cost_leakage);

        let components: Vec<DriverMagnitude> = included
            .iter()
            .flat_map(|r| r.attribution.components.iter().copied())
            .collect();
        let attribution = self.attributor.attribute_components(components);

        let flagged_record_count = records.len() - included.len();
        if flagged_record_count > 0 {
            debug!(site_id, flagged_record_count, "站点存在数据质量标记");
        }

        SiteSummary {
            site_id: site_id.to_string(),
            attributes: site_master.get(site_id).cloned(),
            record_count: records.len(),
            rate_record_count: included.len(),
            flagged_record_count,
            shock_days: records.iter().filter(|r| r.kpi.record.has_shock()).count(),
            planned_units,
            actual_units,
            disposed_units,
            cost_leakage,
            avg_utilization_rate,
            avg_loss_rate,
            weighted_loss_rate,
            worst_classification,
            status,
            dominant_driver: attribution.driver,
            dominant_driver_share: attribution.share,
            recommended_action: attribution.recommended_action,
        }
    }
}

// ==========================================
// 排序比较器 (驾驶舱复用)
// ==========================================

/// 风险排名: 最严重分级降序 → 累计成本泄漏降序 → site_id 升序
pub fn compare_risk_rank(a: &SiteSummary, b: &SiteSummary) -> Ordering {
    b.worst_classification
        .cmp(&a.worst_classification)
        .then_with(|| b.cost_leakage.total_cmp(&a.cost_leakage))
        .then_with(|| a.site_id.cmp(&b.site_id))
}

/// 成本泄漏排名: 累计成本泄漏降序 → site_id 升序
pub fn compare_cost_leakage(a: &SiteSummary, b: &SiteSummary) -> Ordering {
    b.cost_leakage
        .total_cmp(&a.cost_leakage)
        .then_with(|| a.site_id.cmp(&b.site_id))
}

/// 生成排名条目 (输入须已排序)
pub fn rank_sites(sites: &[SiteSummary], top_n: usize) -> Vec<RankedSite> {
    sites
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, s)| RankedSite {
            rank: i + 1,
            site_id: s.site_id.clone(),
            worst_classification: s.worst_classification,
            cost_leakage: s.cost_leakage,
            status: s.status,
            dominant_driver: s.dominant_driver,
            recommended_action: s.recommended_action.clone(),
        })
        .collect()
}

// ==========================================
// 组合级计算
// ==========================================

fn window(classified: &[ClassifiedRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let start = classified.iter().map(|r| r.kpi.date()).min()?;
    let end = classified.iter().map(|r| r.kpi.date()).max()?;
    Some((start, end))
}

fn overall_kpis(classified: &[ClassifiedRecord], site_count: usize) -> OverallKpis {
    let included = || classified.iter().filter(|r| !r.kpi.excluded_from_rates());
    let record_count = classified.len();

    let avg_unit_cost = if record_count == 0 {
        0.0
    } else {
        classified.iter().map(|r| r.kpi.record.unit_cost).sum::<f64>() / record_count as f64
    };

    OverallKpis {
        site_count,
        record_count,
        excluded_record_count: classified
            .iter()
            .filter(|r| r.kpi.excluded_from_rates())
            .count(),
        planned_units: classified.iter().map(|r| r.kpi.record.planned_units).sum(),
        actual_units: classified.iter().map(|r| r.kpi.record.actual_units).sum(),
        usable_units: classified
            .iter()
            .filter_map(|r| r.kpi.record.usable_units)
            .sum(),
        disposed_units: classified.iter().map(|r| r.kpi.record.disposed_units).sum(),
        cost_leakage: classified.iter().map(|r| r.kpi.cost_leakage).sum(),
        avg_unit_cost,
        avg_loss_rate: RateValue::mean(included().filter_map(|r| r.kpi.loss_rate.value())),
        avg_utilization_rate: RateValue::mean(
            included().filter_map(|r| r.kpi.utilization_rate.value()),
        ),
        shock_days: classified
            .iter()
            .filter(|r| r.kpi.record.has_shock())
            .count(),
    }
}

/// 按日趋势 (仅出现过的日期, 不补齐)
pub fn trend_series(classified: &[ClassifiedRecord]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, Vec<f64>, usize)> = BTreeMap::new();

    for record in classified {
        let entry = by_date.entry(record.kpi.date()).or_default();
        entry.0 += record.kpi.cost_leakage;
        entry.2 += 1;
        if !record.kpi.excluded_from_rates() {
            if let Some(v) = record.kpi.loss_rate.value() {
                entry.1.push(v);
            }
        }
    }

    by_date
        .into_iter()
        .map(|(date, (cost_leakage, loss_rates, record_count))| TrendPoint {
            date,
            cost_leakage,
            loss_rate: RateValue::mean(loss_rates),
            record_count,
        })
        .collect()
}

/// 损耗驱动分布 (排除数据质量标记记录)
pub fn driver_mix(classified: &[ClassifiedRecord]) -> Vec<DriverMixEntry> {
    let included: Vec<&ClassifiedRecord> = classified
        .iter()
        .filter(|r| !r.kpi.excluded_from_rates())
        .collect();
    let total = included.len();

    LossDriver::PRECEDENCE
        .into_iter()
        .map(|driver| {
            let record_count = included
                .iter()
                .filter(|r| r.attribution.driver == driver)
                .count();
            let units = included
                .iter()
                .flat_map(|r| r.attribution.components.iter())
                .filter(|c| c.driver == driver)
                .map(|c| c.units)
                .sum();
            let share = if total == 0 {
                0.0
            } else {
                record_count as f64 / total as f64
            };

            DriverMixEntry {
                driver,
                record_count,
                units,
                share,
            }
        })
        .collect()
}

/// 站点内日成本泄漏 z-score 异常
///
/// 使用总体标准差; 站点内成本无波动时不产生异常
fn cost_anomalies(
    by_site: &BTreeMap<&str, Vec<&ClassifiedRecord>>,
    zscore_threshold: f64,
) -> Vec<CostAnomaly> {
    let mut anomalies = Vec::new();

    for (site_id, records) in by_site {
        let rows: Vec<&ClassifiedRecord> = records
            .iter()
            .copied()
            .filter(|r| !r.kpi.has_data_quality_error())
            .collect();
        if rows.len() < 2 {
            continue;
        }

        let n = rows.len() as f64;
        let mean = rows.iter().map(|r| r.kpi.cost_leakage).sum::<f64>() / n;
        let variance = rows
            .iter()
            .map(|r| (r.kpi.cost_leakage - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();
        if std_dev <= f64::EPSILON {
            continue;
        }

        for row in rows {
            let zscore = (row.kpi.cost_leakage - mean) / std_dev;
            if zscore >= zscore_threshold {
                anomalies.push(CostAnomaly {
                    site_id: site_id.to_string(),
                    date: row.kpi.date(),
                    cost_leakage: row.kpi.cost_leakage,
                    zscore,
                });
            }
        }
    }

    anomalies.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.site_id.cmp(&b.site_id)));
    anomalies
}

fn data_quality_sites(by_site: &BTreeMap<&str, Vec<&ClassifiedRecord>>) -> Vec<DataQualitySite> {
    by_site
        .iter()
        .filter_map(|(site_id, records)| {
            let keys: BTreeSet<String> = records
                .iter()
                .filter(|r| r.kpi.excluded_from_rates())
                .map(|r| r.kpi.record.record_key())
                .collect();
            let flagged = records
                .iter()
                .filter(|r| r.kpi.excluded_from_rates())
                .count();

            (flagged > 0).then(|| DataQualitySite {
                site_id: site_id.to_string(),
                flagged_record_count: flagged,
                record_keys: keys.into_iter().collect(),
            })
        })
        .collect()
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::site::SiteDayRecord;
    use crate::engine::attribution::ActionTable;
    use crate::engine::kpi::compute_kpis;
    use crate::engine::risk::classify;

    fn classified(site: &str, day: u32, planned: f64, actual: f64, disposed: f64, cost: f64) -> ClassifiedRecord {
        let kpi = compute_kpis(&SiteDayRecord {
            site_id: site.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            planned_units: planned,
            actual_units: actual,
            disposed_units: disposed,
            unit_cost: cost,
            usable_units: None,
            loss_reason: Some(LossDriver::Spoilage),
            staffing_shortfall: day % 2 == 0,
            supplier_delay: false,
            temp_excursion: false,
            row_number: day as usize + 1,
        });
        let classification = classify(&kpi, &RiskThresholds::default());
        let attribution = LossDriverAttributor::new(actions()).attribute(&kpi);
        ClassifiedRecord {
            kpi,
            classification,
            attribution,
        }
    }

    fn actions() -> ActionTable {
        LossDriver::PRECEDENCE
            .into_iter()
            .map(|d| (d, d.code().to_string()))
            .collect()
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(
            RiskClassifier::default(),
            LossDriverAttributor::new(actions()),
            10,
        )
    }

    #[test]
    fn test_empty_input_fails() {
        let result = aggregator().aggregate(&[], &SiteMaster::new());
        assert_eq!(result, Err(EngineError::EmptyInput));
    }

    #[test]
    fn test_site_summary_excludes_flagged_from_rates() {
        let records = vec![
            classified("A", 1, 100.0, 95.0, 2.0, 1.0),
            classified("A", 2, 0.0, 0.0, 10.0, 5.0),
        ];
        let out = aggregator().aggregate(&records, &SiteMaster::new()).unwrap();
        let site = &out.sites[0];

        assert_eq!(site.record_count, 2);
        assert_eq!(site.rate_record_count, 1);
        assert_eq!(site.flagged_record_count, 1);
        assert_eq!(site.cost_leakage, 52.0);
        assert_eq!(site.avg_loss_rate, RateValue::Defined(0.02));
        assert_eq!(site.weighted_loss_rate, RateValue::Defined(0.02));
        assert_eq!(site.shock_days, 1);

        assert_eq!(out.portfolio.data_quality_sites.len(), 1);
        assert_eq!(out.portfolio.data_quality_sites[0].record_keys, vec!["A@2025-03-02"]);
    }

    #[test]
    fn test_ranking_order() {
        let records = vec![
            classified("C", 1, 100.0, 95.0, 1.0, 1.0),  // Normal, 1
            classified("B", 1, 100.0, 95.0, 20.0, 1.0), // Intervention, 20
            classified("A", 1, 100.0, 95.0, 1.0, 1.0),  // Normal, 1
            classified("D", 1, 100.0, 95.0, 30.0, 1.0), // Intervention, 30
        ];
        let out = aggregator().aggregate(&records, &SiteMaster::new()).unwrap();
        let order: Vec<&str> = out.sites.iter().map(|s| s.site_id.as_str()).collect();
        assert_eq!(order, vec!["D", "B", "A", "C"]);
        assert_eq!(out.portfolio.top_risk_sites[0].rank, 1);
        assert_eq!(out.portfolio.top_risk_sites[0].site_id, "D");
    }

    #[test]
    fn test_top_n_truncates() {
        let records: Vec<ClassifiedRecord> = (1..=5)
            .map(|i| classified(&format!("S{}", i), 1, 100.0, 95.0, i as f64, 1.0))
            .collect();
        let agg = Aggregator::new(RiskClassifier::default(), LossDriverAttributor::new(actions()), 3);
        let out = agg.aggregate(&records, &SiteMaster::new()).unwrap();
        assert_eq!(out.sites.len(), 5);
        assert_eq!(out.portfolio.top_risk_sites.len(), 3);
    }

    #[test]
    fn test_trend_chronological() {
        let records = vec![
            classified("A", 3, 100.0, 95.0, 2.0, 1.0),
            classified("A", 1, 100.0, 95.0, 4.0, 1.0),
            classified("B", 3, 100.0, 95.0, 6.0, 1.0),
        ];
        let trend = trend_series(&records);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(trend[1].cost_leakage, 8.0);
        assert_eq!(trend[1].record_count, 2);
        assert!((trend[1].loss_rate.value().unwrap() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_driver_mix_excludes_flagged() {
        let records = vec![
            classified("A", 1, 100.0, 100.0, 5.0, 1.0),
            classified("A", 2, 0.0, 0.0, 5.0, 1.0),
        ];
        let mix = driver_mix(&records);
        assert_eq!(mix.len(), LossDriver::PRECEDENCE.len());

        let spoilage = mix.iter().find(|m| m.driver == LossDriver::Spoilage).unwrap();
        assert_eq!(spoilage.record_count, 1);
        assert_eq!(spoilage.units, 5.0);
        assert_eq!(spoilage.share, 1.0);
    }

    #[test]
    fn test_cost_anomaly_detected() {
        let mut records: Vec<ClassifiedRecord> = (1..=9)
            .map(|d| classified("A", d, 100.0, 98.0, 1.0, 1.0))
            .collect();
        records.push(classified("A", 10, 100.0, 98.0, 1.0, 100.0));

        let out = aggregator().aggregate(&records, &SiteMaster::new()).unwrap();
        assert_eq!(out.portfolio.anomalies.len(), 1);
        assert_eq!(out.portfolio.anomalies[0].date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(out.portfolio.anomalies[0].zscore >= 2.5);
    }

    #[test]
    fn test_compare_cost_leakage() {
        let records = vec![
            classified("B", 1, 100.0, 95.0, 5.0, 1.0),
            classified("A", 1, 100.0, 95.0, 5.0, 1.0),
            classified("C", 1, 100.0, 95.0, 9.0, 1.0),
        ];
        let mut out = aggregator().aggregate(&records, &SiteMaster::new()).unwrap();
        out.sites.sort_by(compare_cost_leakage);
        let order: Vec<&str> = out.sites.iter().map(|s| s.site_id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }
}
