// ==========================================
// 站点资源运营分析 - PDF 执行报告
// ==========================================
// 工具: lopdf (页面树 + 内容流), comfy-table (等宽表格排版)
// 字体: PDF 标准 Type1 (Helvetica / Helvetica-Bold / Courier), WinAnsiEncoding
// 不在 WinAnsi 范围内的字符输出为 '?'
// 版面: A4, 自上而下逐行排版, 超出下边距自动换页, 页脚页码
// ==========================================

use crate::report::document::{Block, ReportDocument};
use crate::report::error::{ReportError, ReportResult};
use crate::report::ReportRenderer;
use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const LEADING: f32 = 1.35;
const FOOTER_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Mono];

    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Mono => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Mono => "Courier",
        }
    }

    /// 平均字宽 (em), 用于折行估算
    fn avg_char_width(self) -> f32 {
        match self {
            Font::Regular => 0.5,
            Font::Bold => 0.55,
            Font::Mono => 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    font: Font,
    size: f32,
    space_before: f32,
    text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PdfReport {
    body_size: f32,
    table_size: f32,
}

impl Default for PdfReport {
    fn default() -> Self {
        Self {
            body_size: 10.0,
            table_size: 7.0,
        }
    }
}

impl PdfReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成 PDF 字节
    pub fn render_pdf(&self, document: &ReportDocument) -> ReportResult<Vec<u8>> {
        let lines = self.layout(document);
        let pages = paginate(&lines);
        let total = pages.len();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for (index, placed) in pages.into_iter().enumerate() {
            let mut operations: Vec<Operation> = placed
                .iter()
                .flat_map(|(y, line)| text_operations(line.font, line.size, MARGIN, *y, &line.text))
                .collect();

            let footer = format!("{} / {}", index + 1, total);
            let footer_x = PAGE_WIDTH - MARGIN - footer.len() as f32 * FOOTER_SIZE * 0.5;
            operations.extend(text_operations(
                Font::Regular,
                FOOTER_SIZE,
                footer_x,
                MARGIN / 2.0,
                &footer,
            ));

            let content = Content { operations }.encode().map_err(render_error)?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => total as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(render_error)?;
        Ok(bytes)
    }

    fn layout(&self, document: &ReportDocument) -> Vec<Line> {
        let mut lines = Vec::new();
        let body = self.body_size;

        for block in &document.blocks {
            match block {
                Block::Title(text) => push_wrapped(&mut lines, Font::Bold, body * 1.8, 0.0, text),
                Block::Subtitle(text) => push_wrapped(&mut lines, Font::Regular, body, 4.0, text),
                Block::Paragraph(text) => push_wrapped(&mut lines, Font::Regular, body, 6.0, text),
                Block::Warning { label, text } => push_wrapped(
                    &mut lines,
                    Font::Bold,
                    body,
                    8.0,
                    &format!("{} {}", label, text),
                ),
                Block::Heading(text) => push_wrapped(&mut lines, Font::Bold, body * 1.3, 14.0, text),
                Block::Table { headers, rows } => {
                    let width = chars_per_line(Font::Mono, self.table_size);
                    for (i, row) in table_lines(headers, rows, width).into_iter().enumerate() {
                        lines.push(Line {
                            font: Font::Mono,
                            size: self.table_size,
                            space_before: if i == 0 { 6.0 } else { 0.0 },
                            text: row,
                        });
                    }
                }
                Block::Code(text) => {
                    let width = chars_per_line(Font::Mono, self.table_size);
                    for (i, row) in text.lines().flat_map(|l| hard_wrap(l, width)).enumerate() {
                        lines.push(Line {
                            font: Font::Mono,
                            size: self.table_size,
                            space_before: if i == 0 { 6.0 } else { 0.0 },
                            text: row,
                        });
                    }
                }
            }
        }
        lines
    }
}

impl ReportRenderer for PdfReport {
    fn render(&self, document: &ReportDocument) -> ReportResult<Vec<u8>> {
        self.render_pdf(document)
    }
}

fn render_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::RenderError(err.to_string())
}

// ==========================================
// 排版辅助
// ==========================================

fn chars_per_line(font: Font, size: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    ((usable / (size * font.avg_char_width())).floor() as usize).max(1)
}

fn push_wrapped(lines: &mut Vec<Line>, font: Font, size: f32, space_before: f32, text: &str) {
    for (i, row) in wrap(text, chars_per_line(font, size)).into_iter().enumerate() {
        lines.push(Line {
            font,
            size,
            space_before: if i == 0 { space_before } else { 0.0 },
            text: row,
        });
    }
}

/// 按空白折行, 超长单词强制截断
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + word_len > width {
            rows.push(std::mem::take(&mut current));
        }
        if word_len > width {
            let mut pieces = hard_wrap(word, width);
            if let Some(last) = pieces.pop() {
                rows.extend(pieces);
                current = last;
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn table_lines(headers: &[String], rows: &[Vec<String>], width: usize) -> Vec<String> {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width.min(u16::MAX as usize) as u16)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    table.lines().collect()
}

/// 排版到页面: 每页为 (基线 y, 行) 列表
fn paginate(lines: &[Line]) -> Vec<Vec<(f32, &Line)>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages: Vec<Vec<(f32, &Line)>> = vec![Vec::new()];
    let mut y = top;

    for line in lines {
        let height = line.size * LEADING;
        let mut advance = line.space_before + height;

        let page_has_content = pages.last().map_or(false, |p| !p.is_empty());
        if y - advance < MARGIN && page_has_content {
            pages.push(Vec::new());
            y = top;
            advance = height;
        }
        y -= advance;

        if let Some(page) = pages.last_mut() {
            page.push((y, line));
        }
    }
    pages
}

fn text_operations(font: Font, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// 文本 → WinAnsi 字节 (ASCII 与 Latin-1 直接映射)
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x09 => b' ',
            code @ 0x20..=0x7E => code as u8,
            code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}
