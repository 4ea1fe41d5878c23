//! Document assembly: converted content plus metadata into a `.docx`.

pub mod convert;

pub use convert::{convert_nodes, Context, Converted, INDENT, ORDERED_LIST_REF};

use crate::ast::Root;
use crate::docx::{
    convert_inches_to_twip, Alignment, Background, Blob, CoreProperties, Document, Footnote,
    LevelFormat, NumberingConfig, NumberingLevel, Packer, Section, StyleSheet, TableStyle,
};
use crate::error::{ConfigError, ConvertError, Result};
use crate::resolve::ImageDataMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Serialization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Buffer,
    Blob,
}

/// Document metadata and rendering options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocxOptions {
    pub output: OutputMode,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
    pub styles: Option<StyleSheet>,
    pub background: Option<Background>,
    /// Preset applied to every table.
    pub table_style: Option<TableStyle>,
}

impl DocxOptions {
    /// Load options from TOML.
    ///
    /// ```toml
    /// output = "blob"
    /// title = "Report"
    ///
    /// [table_style.header.paragraph]
    /// bold = true
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let options: DocxOptions =
            toml::from_str(input).map_err(|e| ConfigError::Toml(e.to_string()))?;
        Ok(options)
    }
}

/// A packaged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Buffer(Vec<u8>),
    Blob(Blob),
}

impl Output {
    /// The document bytes, whichever mode produced them.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Output::Buffer(data) => data,
            Output::Blob(blob) => blob.data,
        }
    }
}

/// The numbering definition used by ordered lists: six decimal levels, each
/// indented one unit further than the last.
fn ordered_numbering() -> NumberingConfig {
    let levels = (0..6u32)
        .map(|level| NumberingLevel {
            level,
            format: LevelFormat::Decimal,
            text: format!("%{}.", level + 1),
            alignment: Alignment::Start,
            indent: (level > 0).then(|| convert_inches_to_twip(INDENT * f64::from(level))),
        })
        .collect();
    NumberingConfig {
        reference: ORDERED_LIST_REF.to_string(),
        levels,
    }
}

/// Key footnotes by numeric id. Two identifiers sharing an id are rejected.
fn number_footnotes(footnotes: BTreeMap<String, Footnote>) -> Result<BTreeMap<u32, Footnote>> {
    let mut numbered = BTreeMap::new();
    for (identifier, footnote) in footnotes {
        let id = convert::footnote_id(&identifier)?;
        if numbered.insert(id, footnote).is_some() {
            return Err(ConvertError::InvalidFootnoteId(identifier).into());
        }
    }
    Ok(numbered)
}

/// Convert the tree and assemble the document object.
pub fn build_document(root: &Root, options: &DocxOptions, images: &ImageDataMap) -> Result<Document> {
    let ctx = Context::new(images).with_table_style(options.table_style.as_ref());
    let Converted {
        nodes,
        footnotes,
        references,
    } = convert_nodes(&root.children, &ctx)?;
    let footnotes = number_footnotes(footnotes)?;

    let dangling = references
        .into_iter()
        .find(|(id, _)| !footnotes.contains_key(id));
    if let Some((_, identifier)) = dangling {
        return Err(ConvertError::UndefinedFootnote(identifier).into());
    }

    let children = convert::into_blocks(nodes);
    debug!(
        blocks = children.len(),
        footnotes = footnotes.len(),
        "assembled document"
    );

    Ok(Document {
        properties: CoreProperties {
            title: options.title.clone(),
            subject: options.subject.clone(),
            creator: options.creator.clone(),
            keywords: options.keywords.clone(),
            description: options.description.clone(),
            last_modified_by: options.last_modified_by.clone(),
            revision: options.revision,
        },
        styles: options.styles.clone(),
        background: options.background.clone(),
        numbering: vec![ordered_numbering()],
        sections: vec![Section { children }],
        footnotes,
    })
}

/// Convert and package the tree using images already resolved.
pub fn render_docx(root: &Root, options: &DocxOptions, images: &ImageDataMap) -> Result<Output> {
    let doc = build_document(root, options, images)?;
    match options.output {
        OutputMode::Buffer => Ok(Output::Buffer(Packer::to_buffer(&doc)?)),
        OutputMode::Blob => Ok(Output::Blob(Packer::to_blob(&doc)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FootnoteDefinition, FootnoteReference, Literal, Node, Parent};
    use crate::docx::{BodyChild, DOCX_MIME_TYPE};
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn text_paragraph(value: &str) -> Node {
        Node::Paragraph(Parent {
            children: vec![Node::Text(Literal {
                value: value.to_string(),
            })],
        })
    }

    #[test]
    fn test_options_from_toml() {
        let options = DocxOptions::from_toml_str(
            r#"
            output = "blob"
            title = "Report"
            revision = 2

            [background]
            color = "FFFFEE"

            [table_style.options]
            layout = "fixed"
            width = { size = 5000, type = "pct" }

            [table_style.header.row]
            table_header = true
            "#,
        )
        .unwrap();

        assert_eq!(options.output, OutputMode::Blob);
        assert_eq!(options.title.as_deref(), Some("Report"));
        assert_eq!(options.revision, Some(2));
        assert_eq!(options.background.unwrap().color, "FFFFEE");
        let table_style = options.table_style.unwrap();
        assert!(table_style.header.unwrap().row.table_header);
        assert_eq!(
            table_style.options.unwrap().width.unwrap().kind,
            crate::docx::WidthType::Pct
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = DocxOptions::from_toml_str("output = \"pdf\"").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Toml(_))));
    }

    #[test]
    fn test_ordered_numbering_levels() {
        let config = ordered_numbering();
        assert_eq!(config.reference, "ordered");
        assert_eq!(config.levels.len(), 6);
        assert_eq!(config.levels[0].indent, None);
        assert_eq!(config.levels[2].text, "%3.");
        assert_eq!(config.levels[2].indent, Some(1440));
    }

    #[test]
    fn test_build_document() {
        let root = Root::new(vec![
            text_paragraph("hello"),
            Node::FootnoteDefinition(FootnoteDefinition {
                identifier: "2".into(),
                label: None,
                children: vec![text_paragraph("note")],
            }),
        ]);
        let options = DocxOptions {
            title: Some("T".into()),
            ..DocxOptions::default()
        };
        let doc = build_document(&root, &options, &ImageDataMap::new()).unwrap();

        assert_eq!(doc.properties.title.as_deref(), Some("T"));
        assert_eq!(doc.sections.len(), 1);
        assert!(matches!(doc.sections[0].children[0], BodyChild::Paragraph(_)));
        assert!(doc.footnotes.contains_key(&2));
    }

    #[test]
    fn test_non_numeric_footnote_definition() {
        let root = Root::new(vec![Node::FootnoteDefinition(FootnoteDefinition {
            identifier: "note".into(),
            label: None,
            children: vec![],
        })]);
        let err = build_document(&root, &DocxOptions::default(), &ImageDataMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Convert(ConvertError::InvalidFootnoteId(_))
        ));
    }

    fn definition(identifier: &str) -> Node {
        Node::FootnoteDefinition(FootnoteDefinition {
            identifier: identifier.into(),
            label: None,
            children: vec![text_paragraph("note")],
        })
    }

    fn reference(identifier: &str) -> Node {
        Node::Paragraph(Parent {
            children: vec![Node::FootnoteReference(FootnoteReference {
                identifier: identifier.into(),
                label: None,
            })],
        })
    }

    #[test]
    fn test_footnote_id_zero_rejected() {
        let root = Root::new(vec![definition("0")]);
        let err = build_document(&root, &DocxOptions::default(), &ImageDataMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Convert(ConvertError::InvalidFootnoteId(id)) if id == "0"
        ));
    }

    #[test]
    fn test_colliding_footnote_ids() {
        let root = Root::new(vec![definition("1"), definition("1a")]);
        let err = build_document(&root, &DocxOptions::default(), &ImageDataMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Convert(ConvertError::InvalidFootnoteId(id)) if id == "1a"
        ));
    }

    #[test]
    fn test_reference_without_definition() {
        let root = Root::new(vec![reference("7"), definition("1")]);
        let err = build_document(&root, &DocxOptions::default(), &ImageDataMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Convert(ConvertError::UndefinedFootnote(id)) if id == "7"
        ));

        let root = Root::new(vec![reference("1"), definition("1")]);
        let doc = build_document(&root, &DocxOptions::default(), &ImageDataMap::new()).unwrap();
        assert_eq!(doc.footnotes.len(), 1);
    }

    #[test]
    fn test_output_modes() {
        let root = Root::new(vec![text_paragraph("hi")]);
        let images = ImageDataMap::new();

        let buffer = render_docx(&root, &DocxOptions::default(), &images).unwrap();
        assert!(matches!(buffer, Output::Buffer(_)));

        let options = DocxOptions {
            output: OutputMode::Blob,
            ..DocxOptions::default()
        };
        match render_docx(&root, &options, &images).unwrap() {
            Output::Blob(blob) => assert_eq!(blob.mime_type, DOCX_MIME_TYPE),
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
