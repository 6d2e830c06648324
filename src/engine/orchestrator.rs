// ==========================================
// 站点资源运营分析 - 引擎编排器
// ==========================================
// 用途: 协调四个核心引擎的执行顺序
// KPI → 风险分级 + 损耗归因 → 汇总
// 红线: 单向流动, 每一步产出新的不可变值
// ==========================================

use crate::config::config_manager::ConfigManager;
use crate::config::thresholds::RiskThresholds;
use crate::domain::risk::ClassifiedRecord;
use crate::domain::site::Dataset;
use crate::domain::summary::PipelineOutput;
use crate::domain::types::{DataQualityPolicy, LossDriver};
use crate::engine::aggregator::Aggregator;
use crate::engine::attribution::{ActionTable, LossDriverAttributor};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::kpi::KpiEngine;
use crate::engine::risk::RiskClassifier;
use std::collections::BTreeMap;
use tracing::{debug, info};

// ==========================================
// PipelineOrchestrator - 引擎编排器
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    kpi: KpiEngine,
    classifier: RiskClassifier,
    attributor: LossDriverAttributor,
    aggregator: Aggregator,
}

impl PipelineOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - thresholds: 风险阈值 (先校验, 失败即返回配置错误)
    /// - actions: 驱动 → 建议动作
    /// - policy: 数据质量策略
    /// - top_n_sites: 排名条目数
    pub fn new(
        thresholds: RiskThresholds,
        actions: ActionTable,
        policy: DataQualityPolicy,
        top_n_sites: usize,
    ) -> EngineResult<Self> {
        let classifier = RiskClassifier::new(thresholds)?;
        let attributor = LossDriverAttributor::new(actions);

        Ok(Self {
            kpi: KpiEngine::new(policy),
            aggregator: Aggregator::new(classifier, attributor.clone(), top_n_sites),
            classifier,
            attributor,
        })
    }

    /// 从配置管理器创建 (动作文本取当前语言 + 配置覆写)
    pub fn from_config(config: &ConfigManager) -> EngineResult<Self> {
        let overrides: BTreeMap<LossDriver, String> = config.action_overrides()?;
        Self::new(
            config.thresholds(),
            ActionTable::from_locale().with_overrides(overrides),
            config.data_quality_policy(),
            config.top_n_sites(),
        )
    }

    /// 执行完整流水线
    ///
    /// # 返回
    /// - Ok(PipelineOutput): 输出契约 (记录保持输入顺序)
    /// - Err(EngineError::EmptyInput): 输入为空, 不产出任何汇总
    /// - Err(EngineError::DataQuality): FailFast 策略下遇到数据质量错误
    pub fn run(&self, dataset: &Dataset) -> EngineResult<PipelineOutput> {
        if dataset.records.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        info!(
            records = dataset.records.len(),
            sites = dataset.site_master.len(),
            policy = %self.kpi.policy(),
            "开始执行分析流水线"
        );

        // ==========================================
        // 步骤1: KPI Engine
        // ==========================================
        let kpis = self.kpi.compute_all(&dataset.records)?;
        debug!(
            flagged = kpis.iter().filter(|k| k.excluded_from_rates()).count(),
            "KPI 计算完成"
        );

        // ==========================================
        // 步骤2: Risk Classifier + Loss Driver Attributor
        // ==========================================
        let records: Vec<ClassifiedRecord> = kpis
            .into_iter()
            .map(|kpi| ClassifiedRecord {
                classification: self.classifier.classify(&kpi),
                attribution: self.attributor.attribute(&kpi),
                kpi,
            })
            .collect();

        // ==========================================
        // 步骤3: Aggregator
        // ==========================================
        let aggregate = self.aggregator.aggregate(&records, &dataset.site_master)?;

        info!(
            window_start = %aggregate.portfolio.window_start,
            window_end = %aggregate.portfolio.window_end,
            top_site = aggregate.sites.first().map(|s| s.site_id.as_str()).unwrap_or("-"),
            "分析流水线完成"
        );

        Ok(PipelineOutput {
            portfolio: aggregate.portfolio,
            sites: aggregate.sites,
            records,
        })
    }
}
