//! Word-processor document object model.
//!
//! A small, owned tree mirroring the WordprocessingML elements this crate
//! emits. Building it has no side effects; [`packer`] turns a finished
//! [`Document`] into `.docx` bytes.

pub mod packer;
pub mod styles;
mod xml;

pub use packer::{Blob, Packer, DOCX_MIME_TYPE};
pub use styles::{
    Background, CellProperties, ParagraphProperties, ParagraphStyle, RowProperties, StyleSheet,
    TableLayout, TableOptions, TablePartStyle, TableStyle, TableWidth, VerticalAlign, WidthType,
};

use std::collections::BTreeMap;

/// Twips per inch.
const TWIPS_PER_INCH: f64 = 1440.0;

/// Convert inches to twentieths of a point.
pub fn convert_inches_to_twip(inches: f64) -> u32 {
    (inches * TWIPS_PER_INCH).round() as u32
}

/// A complete document: metadata, one body section, numbering and footnotes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub properties: CoreProperties,
    pub styles: Option<StyleSheet>,
    pub background: Option<Background>,
    pub numbering: Vec<NumberingConfig>,
    pub sections: Vec<Section>,
    /// Footnote bodies keyed by footnote id.
    pub footnotes: BTreeMap<u32, Footnote>,
}

/// Core document properties written to `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub children: Vec<BodyChild>,
}

/// Block-level content of a section, table cell or footnote.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyChild {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footnote {
    pub children: Vec<Paragraph>,
}

/// Paragraph style selected by a Markdown heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    Title,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
}

impl HeadingLevel {
    /// Style id in `styles.xml`.
    pub fn style_id(self) -> &'static str {
        match self {
            HeadingLevel::Title => "Title",
            HeadingLevel::Heading1 => "Heading1",
            HeadingLevel::Heading2 => "Heading2",
            HeadingLevel::Heading3 => "Heading3",
            HeadingLevel::Heading4 => "Heading4",
            HeadingLevel::Heading5 => "Heading5",
        }
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Start,
    Both,
}

impl Alignment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Start => "start",
            Alignment::Both => "both",
        }
    }
}

/// List membership of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numbering {
    /// Numbered by the numbering definition registered under `reference`.
    Ordered { reference: String, level: u32 },
    Bullet { level: u32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub children: Vec<ParagraphChild>,
    pub heading: Option<HeadingLevel>,
    /// Start indent in twips.
    pub indent: Option<u32>,
    pub numbering: Option<Numbering>,
    pub alignment: Option<Alignment>,
    /// Render as a horizontal rule.
    pub thematic_break: bool,
    /// Extra properties from a table style preset.
    pub properties: Option<ParagraphProperties>,
}

impl Paragraph {
    pub fn new(children: Vec<ParagraphChild>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    pub fn thematic_break() -> Self {
        Self {
            thematic_break: true,
            ..Self::default()
        }
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphChild {
    Text(TextRun),
    Image(ImageRun),
    Hyperlink(ExternalHyperlink),
    Math(Math),
    CheckBox(CheckBox),
    FootnoteReference(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italics: bool,
    pub strike: bool,
    /// Line breaks emitted before the text.
    pub breaks: u32,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// An empty run holding a single forced line break.
    pub fn line_break() -> Self {
        Self {
            breaks: 1,
            ..Self::default()
        }
    }
}

/// An inline picture sized in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRun {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalHyperlink {
    pub link: String,
    pub children: Vec<ParagraphChild>,
}

/// A task-list checkbox content control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckBox {
    pub checked: bool,
}

impl CheckBox {
    pub const CHECKED_STATE: char = '\u{2611}';
    pub const UNCHECKED_STATE: char = '\u{2610}';

    pub fn glyph(self) -> char {
        if self.checked {
            Self::CHECKED_STATE
        } else {
            Self::UNCHECKED_STATE
        }
    }
}

/// An Office Math zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Math {
    pub children: Vec<MathRun>,
}

/// A structured math run.
#[derive(Debug, Clone, PartialEq)]
pub enum MathRun {
    Run(String),
    SuperScript {
        base: Vec<MathRun>,
        script: Vec<MathRun>,
    },
    SubScript {
        base: Vec<MathRun>,
        script: Vec<MathRun>,
    },
    Fraction {
        numerator: Vec<MathRun>,
        denominator: Vec<MathRun>,
    },
    Radical {
        body: Vec<MathRun>,
        degree: Option<Vec<MathRun>>,
    },
    /// Summation operator over its body; limits are not modelled.
    Sum(Vec<MathRun>),
}

impl MathRun {
    pub fn text(text: impl Into<String>) -> Self {
        MathRun::Run(text.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
    pub options: Option<TableOptions>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub properties: Option<RowProperties>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub children: Vec<BodyChild>,
    pub properties: Option<CellProperties>,
}

/// A numbering definition referenced by ordered-list paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingConfig {
    pub reference: String,
    pub levels: Vec<NumberingLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    Decimal,
    Bullet,
}

impl LevelFormat {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LevelFormat::Decimal => "decimal",
            LevelFormat::Bullet => "bullet",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberingLevel {
    pub level: u32,
    pub format: LevelFormat,
    /// Level text, e.g. `%1.`.
    pub text: String,
    pub alignment: Alignment,
    /// Start indent in twips.
    pub indent: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_inches_to_twip() {
        assert_eq!(convert_inches_to_twip(0.5), 720);
        assert_eq!(convert_inches_to_twip(1.0), 1440);
        assert_eq!(convert_inches_to_twip(2.5), 3600);
    }

    #[test]
    fn test_checkbox_glyphs() {
        assert_eq!(CheckBox { checked: true }.glyph(), '☑');
        assert_eq!(CheckBox { checked: false }.glyph(), '☐');
    }
}
