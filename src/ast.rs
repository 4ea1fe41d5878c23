//! mdast (Markdown Abstract Syntax Tree) definitions consumed by the converter.
//!
//! The tree is produced by an external Markdown parser; nodes follow the
//! mdast vocabulary and deserialize from its JSON form, discriminated by the
//! `type` field. Positional data and unknown fields are ignored.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Root node of an mdast document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Load a tree from its mdast JSON form.
    ///
    /// Accepts either a `{"type": "root", ...}` object or a bare root without a tag.
    pub fn from_json(input: &str) -> Result<Self> {
        let root: Root =
            serde_json::from_str(input).map_err(|e| ConfigError::Json(e.to_string()))?;
        Ok(root)
    }

    /// Depth-first, pre-order walk over every node below the root.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// An mdast node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Root(Root),

    // Block nodes
    Paragraph(Parent),
    Heading(Heading),
    ThematicBreak,
    Blockquote(Parent),
    List(List),
    ListItem(ListItem),
    Table(Table),
    TableRow(Parent),
    TableCell(Parent),
    Html(Literal),
    Code(Code),
    Yaml(Literal),
    Toml(Literal),
    Definition(Definition),
    FootnoteDefinition(FootnoteDefinition),

    // Inline nodes
    Text(Literal),
    Emphasis(Parent),
    Strong(Parent),
    Delete(Parent),
    InlineCode(Literal),
    Break,
    Link(Link),
    Image(Image),
    LinkReference(LinkReference),
    ImageReference(ImageReference),
    Footnote(Parent),
    FootnoteReference(FootnoteReference),

    // Math (mdast extension)
    Math(Literal),
    InlineMath(Literal),

    /// Any `type` the vocabulary above does not name.
    #[serde(other)]
    Unknown,
}

impl Node {
    /// The mdast `type` tag of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Paragraph(_) => "paragraph",
            Node::Heading(_) => "heading",
            Node::ThematicBreak => "thematicBreak",
            Node::Blockquote(_) => "blockquote",
            Node::List(_) => "list",
            Node::ListItem(_) => "listItem",
            Node::Table(_) => "table",
            Node::TableRow(_) => "tableRow",
            Node::TableCell(_) => "tableCell",
            Node::Html(_) => "html",
            Node::Code(_) => "code",
            Node::Yaml(_) => "yaml",
            Node::Toml(_) => "toml",
            Node::Definition(_) => "definition",
            Node::FootnoteDefinition(_) => "footnoteDefinition",
            Node::Text(_) => "text",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::Delete(_) => "delete",
            Node::InlineCode(_) => "inlineCode",
            Node::Break => "break",
            Node::Link(_) => "link",
            Node::Image(_) => "image",
            Node::LinkReference(_) => "linkReference",
            Node::ImageReference(_) => "imageReference",
            Node::Footnote(_) => "footnote",
            Node::FootnoteReference(_) => "footnoteReference",
            Node::Math(_) => "math",
            Node::InlineMath(_) => "inlineMath",
            Node::Unknown => "unknown",
        }
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(root) => &root.children,
            Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::TableRow(p)
            | Node::TableCell(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::Footnote(p) => &p.children,
            Node::Heading(h) => &h.children,
            Node::List(l) => &l.children,
            Node::ListItem(i) => &i.children,
            Node::Table(t) => &t.children,
            Node::FootnoteDefinition(d) => &d.children,
            Node::Link(l) => &l.children,
            Node::LinkReference(r) => &r.children,
            _ => &[],
        }
    }

    /// Depth-first, pre-order walk starting at this node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// A node whose only content is its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A node carrying a literal string value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    #[serde(default)]
    pub value: String,
}

/// Heading node (`#` to `######`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub depth: u8,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// List node (ordered or unordered).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub ordered: Option<bool>,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub spread: Option<bool>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// List item node; `checked` is set for task-list items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub spread: Option<bool>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Table node with per-column alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub align: Vec<Option<AlignKind>>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Table column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignKind {
    Left,
    Right,
    Center,
}

/// Fenced or indented code block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Code {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub meta: Option<String>,
}

/// Link reference definition (`[id]: url`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootnoteDefinition {
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootnoteReference {
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_tagged_nodes() {
        let input = r#"{
            "type": "root",
            "children": [
                {"type": "heading", "depth": 2, "children": [{"type": "text", "value": "Hi"}]},
                {"type": "thematicBreak", "position": {"start": {"line": 2}}},
                {"type": "list", "ordered": true, "spread": false, "children": [
                    {"type": "listItem", "checked": null, "children": []}
                ]},
                {"type": "table", "align": ["left", null, "center"], "children": []}
            ]
        }"#;

        let root = Root::from_json(input).unwrap();
        assert_eq!(root.children.len(), 4);
        assert_eq!(
            root.children[0],
            Node::Heading(Heading {
                depth: 2,
                children: vec![Node::Text(Literal { value: "Hi".into() })],
            })
        );
        assert_eq!(root.children[1], Node::ThematicBreak);
        if let Node::Table(table) = &root.children[3] {
            assert_eq!(
                table.align,
                vec![Some(AlignKind::Left), None, Some(AlignKind::Center)]
            );
        } else {
            panic!("Expected table");
        }
    }

    #[test]
    fn test_unknown_kind_is_kept_as_unknown() {
        let root = Root::from_json(r#"{"children": [{"type": "mdxjsEsm", "value": "x"}]}"#)
            .unwrap();
        assert_eq!(root.children, vec![Node::Unknown]);
        assert_eq!(root.children[0].kind(), "unknown");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = Root::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("Invalid mdast JSON"));
    }

    #[test]
    fn test_walk_visits_nested_images() {
        let root = Root::from_json(
            r#"{"children": [
                {"type": "paragraph", "children": [
                    {"type": "image", "url": "a.png"},
                    {"type": "emphasis", "children": [{"type": "image", "url": "b.png"}]}
                ]}
            ]}"#,
        )
        .unwrap();

        let mut urls = Vec::new();
        root.walk(&mut |node| {
            if let Node::Image(image) = node {
                urls.push(image.url.as_str());
            }
        });
        assert_eq!(urls, vec!["a.png", "b.png"]);
    }
}
