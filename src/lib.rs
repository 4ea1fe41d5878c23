//! # markdown-docx
//!
//! Convert Markdown syntax trees (mdast) into Word `.docx` documents, with
//! LaTeX math rendered as native Office Math.
//!
//! ## Pipeline
//!
//! 1. **Prefetch**: every image in the tree is resolved up front through an
//!    [`ImageResolver`]. A tree without images needs no resolver.
//! 2. **Convert**: mdast nodes become paragraphs, runs, tables and math zones.
//! 3. **Assemble**: the content, footnotes, numbering and metadata are packed
//!    into an Office Open XML package.
//!
//! ## Quick Start
//!
//! ```rust
//! use markdown_docx::{mdast_to_docx, DocxOptions, Output, Root};
//!
//! let tree = r#"{
//!   "type": "root",
//!   "children": [
//!     { "type": "heading", "depth": 1, "children": [{ "type": "text", "value": "Notes" }] },
//!     { "type": "math", "value": "x^2 + y^2 = z^2" }
//!   ]
//! }"#;
//!
//! let root = Root::from_json(tree).unwrap();
//! let output = futures::executor::block_on(mdast_to_docx(&root, &DocxOptions::default(), None)).unwrap();
//! assert!(matches!(output, Output::Buffer(_)));
//! ```
//!
//! ## Supported Markdown
//!
//! - Paragraphs, headings (depth 1 is the title), thematic breaks, blockquotes
//! - Ordered, bullet and task lists, nested to any depth
//! - Tables with column alignment and an optional style preset
//! - Emphasis, strong, strikethrough, links, images, line breaks
//! - Footnote references and definitions
//! - Block and inline math (`math` / `inlineMath` nodes)
//!
//! Code, inline code and HTML are written as plain text. YAML and TOML front
//! matter, link definitions and reference-style links and images are skipped.
//!
//! ## Math
//!
//! Supported: superscripts and subscripts, `\frac`/`\tfrac`/`\dfrac`,
//! `\sqrt` with an optional degree, `\sum`, `\int`, Greek letters and common
//! operator, relation, set and arrow symbols. `\\` and `\newline` start a new
//! math paragraph. Any other macro is written as its name.
//!
//! ## Configuration
//!
//! [`DocxOptions`] can be loaded from TOML:
//!
//! ```text
//! output = "buffer"          # or "blob"
//! title = "Quarterly report"
//! creator = "Jane Doe"
//!
//! [styles]
//! default_font = "Calibri"
//!
//! [table_style.header.paragraph]
//! bold = true
//! ```

pub mod ast;
pub mod docx;
pub mod error;
pub mod math;
pub mod render;
pub mod resolve;

// Convenience re-exports
pub use ast::{Node, Root};
pub use error::{ConfigError, ConvertError, Error, ResolutionError, Result};
pub use math::parse_math;
pub use render::{build_document, render_docx, DocxOptions, Output, OutputMode};
pub use resolve::{resolve_images, ImageData, ImageDataMap, ImageResolver};

/// Resolve images, convert and package a tree in one step.
///
/// `resolver` is only consulted when the tree contains image nodes; passing
/// `None` for such a tree fails before any conversion happens.
pub async fn mdast_to_docx(
    root: &Root,
    options: &DocxOptions,
    resolver: Option<&dyn ImageResolver>,
) -> Result<Output> {
    let images = resolve_images(root, resolver).await?;
    render_docx(root, options, &images)
}
