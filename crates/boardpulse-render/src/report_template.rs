use boardpulse_common::Report;
use pulldown_cmark::{html, Event, Options, Parser};

/// Inputs for the standalone HTML report page.
pub struct ReportPageParams<'a> {
    pub report: &'a Report,
    pub pdf_url: &'a str,
    pub json_url: &'a str,
}

/// HTML report renderer
pub struct ReportRenderer;

impl ReportRenderer {
    /// Convert Markdown to HTML. Raw HTML in the input is escaped, not passed through.
    pub fn markdown_to_html(markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        html_output
    }

    /// Render the full report page.
    pub fn render_report(params: &ReportPageParams<'_>) -> String {
        let report = params.report;
        let template = include_str!("templates/report.html");

        let title = format!(
            "{} {} Report",
            report.board_name,
            crate::type_title(report.report_type)
        );

        let period_start = report.start_date.format("%b %-d, %Y").to_string();
        let period_end = report.end_date.format("%b %-d, %Y").to_string();
        let generated_at = report
            .generated_at
            .format("%B %-d, %Y at %H:%M UTC")
            .to_string();
        let values = [
            ("title", escape_html(&title)),
            ("report_type", report.report_type.as_str().to_string()),
            ("period_start", period_start),
            ("period_end", period_end),
            ("generated_at", generated_at),
            ("pdf_url", escape_html(params.pdf_url)),
            ("json_url", escape_html(params.json_url)),
            ("content", Self::markdown_to_html(&report.content)),
        ];

        fill_template(template, &values)
    }
}

/// Substitute `{{key}}` placeholders in one pass; inserted values are never rescanned.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let value = after.find("}}").and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
