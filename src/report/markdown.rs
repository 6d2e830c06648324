// ==========================================
// 站点资源运营分析 - Markdown 执行报告
// ==========================================
// 表格: comfy-table ASCII_MARKDOWN 预设
// 单元格中的 `|` 转义, 换行折叠为空格
// ==========================================

use crate::report::document::{Block, ReportDocument};
use crate::report::error::ReportResult;
use crate::report::ReportRenderer;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReport;

impl MarkdownReport {
    pub fn new() -> Self {
        Self
    }

    /// 渲染为 Markdown 文本
    pub fn render_markdown(&self, document: &ReportDocument) -> String {
        let mut doc = String::new();
        for block in &document.blocks {
            match block {
                Block::Title(text) => paragraph(&mut doc, &format!("# {}", text)),
                Block::Subtitle(text) => paragraph(&mut doc, &format!("_{}_", text)),
                Block::Paragraph(text) => paragraph(&mut doc, text),
                Block::Warning { label, text } => {
                    paragraph(&mut doc, &format!("> **{}** {}", label, text))
                }
                Block::Heading(text) => paragraph(&mut doc, &format!("## {}", text)),
                Block::Table { headers, rows } => paragraph(&mut doc, &table(headers, rows)),
                Block::Code(text) => {
                    doc.push_str("```json\n");
                    doc.push_str(text);
                    doc.push_str("\n```\n");
                }
            }
        }
        doc
    }
}

impl ReportRenderer for MarkdownReport {
    fn render(&self, document: &ReportDocument) -> ReportResult<Vec<u8>> {
        Ok(self.render_markdown(document).into_bytes())
    }
}

fn paragraph(doc: &mut String, text: &str) {
    doc.push_str(text);
    doc.push_str("\n\n");
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_MARKDOWN)
        .set_header(headers.iter().map(|h| escape_cell(h)).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row.iter().map(|c| escape_cell(c)).collect::<Vec<_>>());
    }
    table.trim_fmt()
}
