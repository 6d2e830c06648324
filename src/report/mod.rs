// ==========================================
// 站点资源运营分析 - 报告层
// ==========================================
// 职责: 输出契约 → 报告文档 → 执行报告 (PDF + Markdown) / JSON / 控制台摘要
// 红线: 只读消费 PipelineOutput
// ==========================================

pub mod console;
pub mod document;
pub mod error;
pub mod format;
pub mod markdown;
pub mod pdf;

pub use console::render_console_summary;
pub use document::{Block, ReportDocument};
pub use error::{ReportError, ReportResult};
pub use markdown::MarkdownReport;
pub use pdf::PdfReport;

use crate::domain::summary::PipelineOutput;
use std::fs;
use std::path::Path;
use tracing::info;

/// 报告渲染器 (文档 → 文件字节)
pub trait ReportRenderer {
    fn render(&self, document: &ReportDocument) -> ReportResult<Vec<u8>>;
}

/// 写入文件 (自动创建父目录)
pub fn write_bytes(path: &Path, content: &[u8]) -> ReportResult<()> {
    let to_err = |e: std::io::Error| ReportError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_err)?;
    }
    fs::write(path, content).map_err(to_err)?;

    info!(path = %path.display(), bytes = content.len(), "报告已写入");
    Ok(())
}

/// 输出契约 → JSON 文本
pub fn to_json(output: &PipelineOutput) -> ReportResult<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

/// 渲染并写入报告
pub fn write_report<R: ReportRenderer>(
    renderer: &R,
    document: &ReportDocument,
    path: &Path,
) -> ReportResult<()> {
    let content = renderer.render(document)?;
    write_bytes(path, &content)
}

/// 写入 JSON 输出契约
pub fn write_json(output: &PipelineOutput, path: &Path) -> ReportResult<()> {
    write_bytes(path, to_json(output)?.as_bytes())
}
