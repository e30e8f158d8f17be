//! Formatter configuration

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Display/export format for the preview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Canonical text, verbatim
    Plain,
    /// Styled markup fragment for an embedded editor
    #[default]
    Rich,
    /// Self-contained HTML document
    Html,
}

/// Line height applied to rendered paragraphs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum LineSpacing {
    #[serde(rename = "single")]
    #[value(name = "single")]
    Single,
    #[default]
    #[serde(rename = "1.15")]
    #[value(name = "1.15")]
    OnePointOneFive,
    #[serde(rename = "1.5")]
    #[value(name = "1.5")]
    OnePointFive,
    #[serde(rename = "double")]
    #[value(name = "double")]
    Double,
}

impl LineSpacing {
    /// CSS `line-height` value
    pub fn line_height(self) -> &'static str {
        match self {
            LineSpacing::Single => "1.0",
            LineSpacing::OnePointOneFive => "1.15",
            LineSpacing::OnePointFive => "1.5",
            LineSpacing::Double => "2.0",
        }
    }
}

/// Policy deciding how numbered and lettered lines are styled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NumberingStyle {
    /// Bold lettered subsections, justified indented items
    #[default]
    Professional,
    /// Bullets and numbered lines become real lists
    StandardLists,
    /// Roman-numeral headings, medium-weight lettered paragraphs
    Academic,
}

/// Everything the formatter needs besides the canonical text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderState {
    pub output_format: OutputFormat,
    /// Show the centered title banner above the content
    pub professional_header: bool,
    font_size_pt: u32,
    indent_px: u32,
    pub line_spacing: LineSpacing,
    pub numbering_style: NumberingStyle,
    /// Banner text and HTML document title
    pub header_title: String,
}

impl RenderState {
    pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 8..=16;
    pub const INDENT_RANGE: std::ops::RangeInclusive<u32> = 10..=50;

    /// Set the base font size, clamped to 8..=16 pt
    pub fn with_font_size(mut self, pt: u32) -> Self {
        self.font_size_pt = clamp(pt, &Self::FONT_SIZE_RANGE);
        self
    }

    /// Set the indent step, clamped to 10..=50 px
    pub fn with_indent(mut self, px: u32) -> Self {
        self.indent_px = clamp(px, &Self::INDENT_RANGE);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_numbering(mut self, style: NumberingStyle) -> Self {
        self.numbering_style = style;
        self
    }

    pub fn with_spacing(mut self, spacing: LineSpacing) -> Self {
        self.line_spacing = spacing;
        self
    }

    pub fn with_header(mut self, enabled: bool) -> Self {
        self.professional_header = enabled;
        self
    }

    pub fn font_size_pt(&self) -> u32 {
        clamp(self.font_size_pt, &Self::FONT_SIZE_RANGE)
    }

    pub fn indent_px(&self) -> u32 {
        clamp(self.indent_px, &Self::INDENT_RANGE)
    }
}

fn clamp(value: u32, range: &std::ops::RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Rich,
            professional_header: true,
            font_size_pt: 11,
            indent_px: 20,
            line_spacing: LineSpacing::OnePointOneFive,
            numbering_style: NumberingStyle::Professional,
            header_title: "03-0000 CONCRETE SCOPE OF WORK".to_string(),
        }
    }
}
