//! Rich text and HTML rendering of canonical scope text
//!
//! Rendering happens in two steps:
//! 1. **Classification**: each line of the canonical text becomes a [`Block`]
//!    according to the active [`NumberingStyle`]
//! 2. **Writing**: blocks are serialized to markup (see [`markup`])
//!
//! The intermediate blocks are also what the editable surface operates on,
//! so structural edits and fresh renders share one writer.

mod markup;
mod render_state;

pub use markup::{escape_html, write_document, write_fragment};
pub use render_state::{LineSpacing, NumberingStyle, OutputFormat, RenderState};

use regex::Regex;
use std::sync::OnceLock;

/// Visual role of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Empty line
    Break,
    /// Horizontal rule
    Rule,
    /// Upper-case `**SECTION**` line, written as a large heading under a rule
    SectionHeader,
    /// `**Mixed case**` line
    Bold,
    /// Lettered subsection ("A. ...") in the professional style
    Subsection,
    /// Roman-numeral heading in the academic style
    Heading,
    /// Lettered paragraph in the academic style
    Medium,
    /// Numbered item paragraph
    Justified,
    /// Anything else
    Paragraph,
}

/// List container a block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// One line of rendered content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Display text (leading whitespace and list markers removed)
    pub text: String,
    /// Left margin in pixels
    pub margin_px: u32,
    pub list: Option<ListKind>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            margin_px: 0,
            list: None,
        }
    }

    fn indented(mut self, margin_px: u32) -> Self {
        self.margin_px = margin_px;
        self
    }

    fn listed(mut self, list: ListKind) -> Self {
        self.list = Some(list);
        self
    }

    /// Breaks and rules carry no text and ignore structural edits
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, BlockKind::Break | BlockKind::Rule)
    }
}

/// Render canonical text in the format selected by `state`
///
/// Rendering is pure: the same `(text, state)` pair always yields the same
/// output.
pub fn render(text: &str, state: &RenderState) -> String {
    match state.output_format {
        OutputFormat::Plain => text.to_string(),
        OutputFormat::Rich => write_fragment(&classify(text, state), state),
        OutputFormat::Html => write_document(&classify(text, state), state),
    }
}

/// Split canonical text into styled blocks
pub fn classify(text: &str, state: &RenderState) -> Vec<Block> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.lines()
        .map(|line| classify_line(line.trim_end(), state))
        .collect()
}

fn classify_line(line: &str, state: &RenderState) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::new(BlockKind::Break, "");
    }

    if let Some(inner) = bold_marker_text(trimmed) {
        return if is_upper_case(inner) {
            Block::new(BlockKind::SectionHeader, inner)
        } else {
            Block::new(BlockKind::Bold, inner)
        };
    }

    if is_rule(trimmed) {
        return Block::new(BlockKind::Rule, "");
    }

    let indent = state.indent_px();
    match state.numbering_style {
        NumberingStyle::Professional => {
            if patterns().letter.is_match(line) {
                Block::new(BlockKind::Subsection, trimmed)
            } else if patterns().item.is_match(line) {
                Block::new(BlockKind::Justified, trimmed).indented(indent)
            } else if patterns().sub_item.is_match(line) {
                Block::new(BlockKind::Justified, trimmed).indented(indent * 2)
            } else {
                Block::new(BlockKind::Paragraph, trimmed)
            }
        }
        NumberingStyle::StandardLists => {
            if let Some(caps) = patterns().bullet.captures(line) {
                Block::new(BlockKind::Paragraph, &caps[1]).listed(ListKind::Bullet)
            } else if let Some(caps) = patterns().ordered.captures(line) {
                Block::new(BlockKind::Paragraph, &caps[1]).listed(ListKind::Numbered)
            } else {
                Block::new(BlockKind::Paragraph, trimmed)
            }
        }
        NumberingStyle::Academic => {
            if patterns().roman.is_match(line) {
                Block::new(BlockKind::Heading, trimmed)
            } else if patterns().letter.is_match(line) {
                Block::new(BlockKind::Medium, trimmed).indented(indent)
            } else {
                Block::new(BlockKind::Paragraph, trimmed)
            }
        }
    }
}

/// Inner text of a `**...**` line, unless the line is only asterisks
fn bold_marker_text(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix("**")?.strip_suffix("**")?.trim();
    if inner.chars().all(|c| c == '*') {
        None
    } else {
        Some(inner)
    }
}

/// At least one cased character and no lower-case ones
fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// Four or more of the same rule character and nothing else
fn is_rule(trimmed: &str) -> bool {
    trimmed.chars().count() >= 4
        && (trimmed.chars().all(|c| c == '-') || trimmed.chars().all(|c| c == '*'))
}

struct Patterns {
    letter: Regex,
    item: Regex,
    sub_item: Regex,
    bullet: Regex,
    ordered: Regex,
    roman: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        letter: Regex::new(r"^[A-Z]\. ").expect("valid letter regex"),
        item: Regex::new(r"^\s+\d+\. ").expect("valid item regex"),
        sub_item: Regex::new(r"^\s*\d+\.\d+\. ").expect("valid sub-item regex"),
        bullet: Regex::new(r"^\s*[•*]\s+(.*)$").expect("valid bullet regex"),
        ordered: Regex::new(r"^\s*\d+\.\s+(.*)$").expect("valid ordered regex"),
        roman: Regex::new(r"^\s*[IVXLCDM]+\. ").expect("valid roman regex"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(style: NumberingStyle) -> RenderState {
        RenderState::default().with_numbering(style).with_indent(20)
    }

    fn kinds(blocks: &[Block]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_professional_classification() {
        let text = "----------------------------------------\n**SCOPE CLARIFICATIONS**\n\nA. Item A\n    1. Note 1\n    1.1. Detail\nloose text";
        let blocks = classify(text, &state(NumberingStyle::Professional));
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::Rule,
                BlockKind::SectionHeader,
                BlockKind::Break,
                BlockKind::Subsection,
                BlockKind::Justified,
                BlockKind::Justified,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(blocks[1].text, "SCOPE CLARIFICATIONS");
        assert_eq!(blocks[4].text, "1. Note 1");
        assert_eq!(blocks[4].margin_px, 20);
        assert_eq!(blocks[5].margin_px, 40);
        assert_eq!(blocks[6].margin_px, 0);
    }

    #[test]
    fn test_bold_vs_header() {
        let blocks = classify("**Notes**\n**NOTES 2**", &RenderState::default());
        assert_eq!(blocks[0].kind, BlockKind::Bold);
        assert_eq!(blocks[1].kind, BlockKind::SectionHeader);
    }

    #[test]
    fn test_asterisk_rule() {
        let blocks = classify("****\n*****\n---", &RenderState::default());
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Rule, BlockKind::Rule, BlockKind::Paragraph]
        );
    }

    #[test]
    fn test_standard_lists_strip_markers() {
        let blocks = classify(
            "* milk\n• eggs\n    2. bread",
            &state(NumberingStyle::StandardLists),
        );
        assert_eq!(blocks[0].text, "milk");
        assert_eq!(blocks[0].list, Some(ListKind::Bullet));
        assert_eq!(blocks[1].text, "eggs");
        assert_eq!(blocks[1].list, Some(ListKind::Bullet));
        assert_eq!(blocks[2].text, "bread");
        assert_eq!(blocks[2].list, Some(ListKind::Numbered));
    }

    #[test]
    fn test_academic_classification() {
        let blocks = classify(
            "IV. Results\nA. Method\n    1. step",
            &state(NumberingStyle::Academic),
        );
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Heading, BlockKind::Medium, BlockKind::Paragraph]
        );
        assert_eq!(blocks[1].margin_px, 20);
    }

    #[test]
    fn test_plain_is_verbatim() {
        let text = "**A**\n\nA. x";
        let plain = RenderState::default().with_format(OutputFormat::Plain);
        assert_eq!(render(text, &plain), text);
    }

    #[test]
    fn test_render_is_idempotent() {
        let text = "**SCOPE**\n\nA. One\n    1. Two";
        for format in [OutputFormat::Rich, OutputFormat::Html] {
            let s = RenderState::default().with_format(format);
            assert_eq!(render(text, &s), render(text, &s));
        }
    }

    #[test]
    fn test_empty_text_renders_empty_fragment() {
        assert_eq!(render("  \n", &RenderState::default()), "");
    }

    #[test]
    fn test_standard_lists_markup() {
        let s = state(NumberingStyle::StandardLists).with_header(false);
        let markup = render("* milk", &s);
        assert!(markup.contains("<ul"));
        assert!(markup.contains("<li>milk</li>"));
        assert!(!markup.contains("* milk"));
    }
}
