use anyhow::Result;
use boardpulse_common::Report;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
const BODY_SIZE: f32 = 10.5;
const BODY_WRAP: usize = 95;
const HEADING_WRAP: usize = 70;

/// Attachment file name: `{board}_{type}_report_{YYYY-MM-DD}.pdf`.
///
/// Characters that are unsafe in a `Content-Disposition` header become `_`.
pub fn pdf_file_name(report: &Report) -> String {
    let board: String = report
        .board_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let board = if board.is_empty() { "board".to_string() } else { board };
    format!(
        "{}_{}_report_{}.pdf",
        board,
        report.report_type,
        report.generated_day().format("%Y-%m-%d")
    )
}

/// Plain-text PDF export of a report narrative.
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn render(report: &Report) -> Result<Vec<u8>> {
        let title = format!(
            "{} {} Report",
            report.board_name,
            crate::type_title(report.report_type)
        );
        let (doc, page, layer) = PdfDocument::new(
            &title,
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let regular = builtin_font(&doc, BuiltinFont::Helvetica)?;
        let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;
        let italic = builtin_font(&doc, BuiltinFont::HelveticaOblique)?;

        let first = doc.get_page(page).get_layer(layer);
        let mut writer = PageWriter {
            doc: &doc,
            layer: first,
            y: PAGE_HEIGHT - MARGIN,
        };

        for line in wrap(&plain_text(&title), HEADING_WRAP) {
            writer.line(&line, 16.0, &bold);
        }
        writer.gap(3.0);
        writer.line(
            &format!(
                "Period: {} to {}",
                report.start_date.format("%b %-d, %Y"),
                report.end_date.format("%b %-d, %Y")
            ),
            10.0,
            &italic,
        );
        writer.line(
            &format!(
                "Generated: {}",
                report.generated_at.format("%B %-d, %Y at %H:%M UTC")
            ),
            10.0,
            &italic,
        );
        writer.gap(6.0);

        for raw in report.content.lines() {
            let trimmed = raw.trim_end();
            if trimmed.trim().is_empty() {
                writer.gap(2.5);
                continue;
            }
            if trimmed.trim_start().starts_with("---") && trimmed.trim().chars().all(|c| c == '-')
            {
                writer.gap(3.0);
                continue;
            }

            match heading_level(trimmed) {
                Some((level, text)) => {
                    let (size, width) = match level {
                        1 => (14.0, HEADING_WRAP),
                        2 => (12.5, HEADING_WRAP),
                        _ => (11.0, BODY_WRAP),
                    };
                    writer.gap(2.0);
                    for line in wrap(&plain_text(text), width) {
                        writer.line(&line, size, &bold);
                    }
                }
                None => {
                    for line in wrap(&plain_text(trimmed), BODY_WRAP) {
                        writer.line(&line, BODY_SIZE, &regular);
                    }
                }
            }
        }

        doc.save_to_bytes()
            .map_err(|e| anyhow::anyhow!("Failed to serialize PDF: {e:?}"))
    }
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| anyhow::anyhow!("Failed to load builtin font: {e:?}"))
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        let height = size * PT_TO_MM * 1.45;
        if self.y - height < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

fn heading_level(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && trimmed[level..].starts_with(' ') {
        Some((level, trimmed[level..].trim()))
    } else {
        None
    }
}

/// Strip inline Markdown markers and map text onto the builtin font's character set.
fn plain_text(line: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let body = if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        format!("{indent}- {rest}")
    } else {
        line.to_string()
    };

    let mut out = String::with_capacity(body.len());
    for c in body.replace("**", "").replace("__", "").replace('`', "").chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2022}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\t' => out.push_str("    "),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Greedy word wrap on character count; overlong words are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let indent_len = text.len() - text.trim_start().len();
    let indent = &text[..indent_len];
    let mut lines = Vec::new();
    let mut current = indent.to_string();
    let mut current_len = indent.chars().count();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > indent_len {
                lines.push(std::mem::replace(&mut current, indent.to_string()));
                current_len = indent_len;
            }
            let rest = word.split_off(width.saturating_sub(indent_len).max(1));
            lines.push(format!("{indent}{}", word.iter().collect::<String>()));
            word = rest;
        }
        let needed = if current_len > indent_len { word.len() + 1 } else { word.len() };
        if current_len + needed > width && current_len > indent_len {
            lines.push(std::mem::replace(&mut current, indent.to_string()));
            current_len = indent_len;
        }
        if current_len > indent_len {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > indent_len || lines.is_empty() {
        lines.push(current);
    }
    lines
}
