//! Caller supplied styling: style sheet, page background and table presets.
//!
//! These types are deserializable so they can be loaded as part of the
//! conversion options.

use super::Alignment;
use serde::Deserialize;

/// Additions to the built-in style sheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    /// Default run font family.
    pub default_font: Option<String>,
    /// Default run size in half-points.
    pub default_size: Option<u32>,
    /// Paragraph styles; an entry whose id matches a built-in style replaces it.
    pub paragraph_styles: Vec<ParagraphStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParagraphStyle {
    pub id: String,
    pub name: String,
    pub based_on: Option<String>,
    pub next: Option<String>,
    pub bold: bool,
    pub italics: bool,
    /// Size in half-points.
    pub size: Option<u32>,
    /// Hex RGB color without `#`.
    pub color: Option<String>,
    pub font: Option<String>,
    /// Outline level shown in the navigation pane (0 for top-level headings).
    pub outline_level: Option<u8>,
}

/// Page background color.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Background {
    /// Hex RGB color without `#`.
    pub color: String,
}

/// Styling preset applied to every Markdown table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub options: Option<TableOptions>,
    /// Applied to the first row.
    pub header: Option<TablePartStyle>,
    /// Applied to every other row.
    pub body: Option<TablePartStyle>,
}

/// Row, cell and paragraph properties for one part of a table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TablePartStyle {
    pub row: RowProperties,
    pub cell: CellProperties,
    pub paragraph: ParagraphProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub width: Option<TableWidth>,
    pub layout: Option<TableLayout>,
    /// Table style id from the style sheet.
    pub style: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TableWidth {
    pub size: u32,
    #[serde(rename = "type", default)]
    pub kind: WidthType,
}

/// Unit of a table or cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthType {
    #[default]
    Auto,
    /// Twips.
    Dxa,
    /// Fiftieths of a percent.
    Pct,
    Nil,
}

impl WidthType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            WidthType::Auto => "auto",
            WidthType::Dxa => "dxa",
            WidthType::Pct => "pct",
            WidthType::Nil => "nil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLayout {
    Autofit,
    Fixed,
}

impl TableLayout {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TableLayout::Autofit => "autofit",
            TableLayout::Fixed => "fixed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RowProperties {
    /// Repeat the row at the top of each page.
    pub table_header: bool,
    pub cant_split: bool,
    /// Minimum height in twips.
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CellProperties {
    pub width: Option<TableWidth>,
    /// Hex RGB shading fill without `#`.
    pub shading: Option<String>,
    pub vertical_align: Option<VerticalAlign>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParagraphProperties {
    /// Paragraph style id.
    pub style: Option<String>,
    /// Used for cells beyond the table's alignment list.
    pub alignment: Option<Alignment>,
    /// Spacing before, in twips.
    pub spacing_before: Option<u32>,
    /// Spacing after, in twips.
    pub spacing_after: Option<u32>,
    /// Render every run in the paragraph bold.
    pub bold: bool,
}
