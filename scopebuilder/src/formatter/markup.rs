//! Markup writer for classified blocks
//!
//! Rich output is an HTML fragment with inline styles, suitable for an
//! embedded editor. HTML output wraps the same fragment in a document shell
//! whose stylesheet is driven by the render state.

use itertools::Itertools;

use super::{Block, BlockKind, ListKind, RenderState};

/// Write blocks as a styled fragment (no document shell)
///
/// An empty block list yields an empty string, banner included.
pub fn write_fragment(blocks: &[Block], state: &RenderState) -> String {
    let mut output = String::new();
    if blocks.is_empty() {
        return output;
    }

    if state.professional_header {
        write_banner(&mut output, state);
    }

    for (list, group) in &blocks.iter().chunk_by(|block| block.list) {
        match list {
            Some(kind) => write_list(&mut output, kind, group, state),
            None => {
                for block in group {
                    write_block(&mut output, block, state);
                }
            }
        }
    }

    output
}

/// Write blocks as a complete HTML document
pub fn write_document(blocks: &[Block], state: &RenderState) -> String {
    let mut output = String::new();
    write_html_header(&mut output, state);
    output.push_str("<body>\n");
    output.push_str(&write_fragment(blocks, state));
    output.push_str("</body>\n");
    output.push_str("</html>\n");
    output
}

/// Write HTML header with a stylesheet derived from the render state
fn write_html_header(output: &mut String, state: &RenderState) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(&document_title(&state.header_title))
    ));
    output.push_str("<style>\n");
    output.push_str(&stylesheet(state));
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

/// Title-case the banner text for the `<title>` element, dropping a leading
/// section code such as "03-0000"
fn document_title(header: &str) -> String {
    header
        .split_whitespace()
        .skip_while(|word| word.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .map(|word| {
            let lower = word.to_lowercase();
            if lower == "of" {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .join(" ")
}

fn stylesheet(state: &RenderState) -> String {
    let font = state.font_size_pt();
    let indent = state.indent_px();
    let line_height = state.line_spacing.line_height();
    format!(
        r#"body {{ font-family: Arial, sans-serif; font-size: {font}pt; line-height: {line_height}; margin: 1in; color: #000; }}
h1 {{ font-size: {h1}pt; text-align: center; margin-bottom: 25px; letter-spacing: 1px; }}
h2 {{ font-size: {h2}pt; margin: 15px 0 12px 0; letter-spacing: 0.5px; }}
hr {{ border: none; border-bottom: 1px solid #000; margin: 15px 0 5px 0; }}
ul, ol {{ margin: 4px 0 4px {indent}px; }}
.indent-1 {{ margin-left: {indent1}px; }}
.indent-2 {{ margin-left: {indent2}px; }}
.indent-3 {{ margin-left: {indent3}px; }}
.subsection {{ font-weight: bold; margin: 12px 0 8px 0; }}
.item {{ margin: 4px 0; text-align: justify; }}
@page {{ margin: 1in; }}
@media print {{ body {{ margin: 0; }} }}
"#,
        h1 = font + 3,
        h2 = font + 1,
        indent1 = indent,
        indent2 = indent * 2,
        indent3 = indent * 3,
    )
}

fn write_banner(output: &mut String, state: &RenderState) {
    output.push_str(&format!(
        "<div style=\"text-align: center; margin-bottom: 25px; page-break-inside: avoid;\"><h1 style=\"font-size: {}pt; font-weight: bold; margin: 0; letter-spacing: 1px;\">{}</h1></div>\n",
        state.font_size_pt() + 3,
        escape_html(&state.header_title)
    ));
}

/// Write a single block to the output
fn write_block(output: &mut String, block: &Block, state: &RenderState) {
    let font = state.font_size_pt();
    let line_height = state.line_spacing.line_height();
    let text = escape_html(&block.text);

    match block.kind {
        BlockKind::Break => output.push_str("<br>\n"),

        BlockKind::Rule => output.push_str(
            "<hr style=\"border: none; border-bottom: 2px solid #000; margin: 20px 0 15px 0;\">\n",
        ),

        BlockKind::SectionHeader => {
            output.push_str(
                "<hr style=\"border: none; border-bottom: 1px solid #000; margin: 15px 0 5px 0;\">\n",
            );
            output.push_str(&format!(
                "<h2 style=\"font-size: {}pt; font-weight: bold; margin: 15px 0 12px 0; text-align: left; letter-spacing: 0.5px; line-height: {};{}\">{}</h2>\n",
                font + 1,
                line_height,
                margin_style(block),
                text
            ));
        }

        BlockKind::Bold => output.push_str(&format!(
            "<p style=\"font-weight: bold; margin: 10px 0; font-size: {}pt;{}\">{}</p>\n",
            font,
            margin_style(block),
            text
        )),

        BlockKind::Subsection => output.push_str(&format!(
            "<p style=\"font-size: {}pt; font-weight: bold; margin: 12px 0 8px 0; line-height: {}; color: #000;{}\">{}</p>\n",
            font,
            line_height,
            margin_style(block),
            text
        )),

        BlockKind::Heading => output.push_str(&format!(
            "<h3 style=\"font-size: {}pt; font-weight: bold; margin: 12px 0 8px 0; line-height: {};{}\">{}</h3>\n",
            font + 1,
            line_height,
            margin_style(block),
            text
        )),

        BlockKind::Medium => output.push_str(&format!(
            "<p style=\"font-size: {}pt; font-weight: 500; margin: 5px 0; line-height: {};{}\">{}</p>\n",
            font,
            line_height,
            margin_style(block),
            text
        )),

        BlockKind::Justified => output.push_str(&format!(
            "<p style=\"font-size: {}pt; margin: 4px 0; line-height: {}; text-align: justify;{}\">{}</p>\n",
            font,
            line_height,
            margin_style(block),
            text
        )),

        BlockKind::Paragraph => output.push_str(&format!(
            "<p style=\"font-size: {}pt; margin: 5px 0; line-height: {};{}\">{}</p>\n",
            font,
            line_height,
            margin_style(block),
            text
        )),
    }
}

/// Write a run of list blocks inside one list container
fn write_list<'a>(
    output: &mut String,
    kind: ListKind,
    items: impl Iterator<Item = &'a Block>,
    state: &RenderState,
) {
    let tag = match kind {
        ListKind::Bullet => "ul",
        ListKind::Numbered => "ol",
    };
    output.push_str(&format!(
        "<{} style=\"font-size: {}pt; line-height: {};\">\n",
        tag,
        state.font_size_pt(),
        state.line_spacing.line_height()
    ));
    for item in items {
        output.push_str(&format!("<li>{}</li>\n", escape_html(&item.text)));
    }
    output.push_str(&format!("</{}>\n", tag));
}

/// Trailing `margin-left` declaration for indented blocks
fn margin_style(block: &Block) -> String {
    if block.margin_px == 0 {
        String::new()
    } else {
        format!(" margin-left: {}px;", block.margin_px)
    }
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
