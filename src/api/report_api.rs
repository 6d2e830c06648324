// ==========================================
// 站点资源运营分析 - 报告 API
// ==========================================
// 职责: 加载 → 流水线 → 写出执行报告 (PDF + Markdown, 可选 JSON 输出契约)
// 调用方: CLI report 子命令
// ==========================================

use crate::api::error::ApiResult;
use crate::config::config_manager::ConfigManager;
use crate::domain::site::Dataset;
use crate::domain::summary::PipelineOutput;
use crate::engine::orchestrator::PipelineOrchestrator;
use crate::importer::loader::RecordLoader;
use crate::report::{self, MarkdownReport, PdfReport, ReportDocument};
use std::path::PathBuf;
use tracing::info;

/// 报告生成结果
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub output: PipelineOutput,
    pub report_path: PathBuf,          // PDF
    pub markdown_path: PathBuf,
    pub summary_path: Option<PathBuf>,
}

pub struct ReportApi {
    config: ConfigManager,
    loader: RecordLoader,
}

impl ReportApi {
    pub fn new(config: ConfigManager) -> Self {
        Self {
            config,
            loader: RecordLoader::new(),
        }
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// 从配置的数据目录加载数据集
    pub fn load_dataset(&self) -> ApiResult<Dataset> {
        Ok(self.loader.load_from_dir(&self.config.data_dir())?)
    }

    /// 构造编排器 (阈值校验在此完成, 早于任何分级)
    pub fn orchestrator(&self) -> ApiResult<PipelineOrchestrator> {
        Ok(PipelineOrchestrator::from_config(&self.config)?)
    }

    /// 运行流水线
    pub fn run(&self) -> ApiResult<PipelineOutput> {
        let orchestrator = self.orchestrator()?;
        let dataset = self.load_dataset()?;
        Ok(orchestrator.run(&dataset)?)
    }

    /// 生成报告
    ///
    /// # 参数
    /// - with_json: 同时写出 JSON 输出契约
    pub fn generate(&self, with_json: bool) -> ApiResult<ReportOutcome> {
        let output = self.run()?;

        let snapshot = self.config.config_snapshot()?;
        let document = ReportDocument::build(&output, self.config.top_n_sites(), Some(&snapshot));

        let report_path = self.config.report_path();
        report::write_report(&PdfReport::new(), &document, &report_path)?;
        let markdown_path = self.config.markdown_report_path();
        report::write_report(&MarkdownReport::new(), &document, &markdown_path)?;

        let summary_path = if with_json {
            let path = self.config.summary_path();
            report::write_json(&output, &path)?;
            Some(path)
        } else {
            None
        };

        info!(
            report = %report_path.display(),
            sites = output.sites.len(),
            "报告生成完成"
        );

        Ok(ReportOutcome {
            output,
            report_path,
            markdown_path,
            summary_path,
        })
    }
}
