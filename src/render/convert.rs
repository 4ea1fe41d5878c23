//! Conversion of mdast nodes into document content.
//!
//! The [`Context`] is `Copy` and every recursive call receives its own
//! extended copy, so decorations, indentation and list state set inside one
//! subtree never reach its siblings.

use crate::ast::{AlignKind, Code, FootnoteDefinition, Heading, ListItem, Literal, Node};
use crate::docx::{
    self, convert_inches_to_twip, Alignment, BodyChild, CheckBox, ExternalHyperlink, Footnote,
    HeadingLevel, ImageRun, Math, Numbering, Paragraph, ParagraphChild, TableCell, TablePartStyle,
    TableRow, TableStyle, TextRun,
};
use crate::error::{ConvertError, ResolutionError, Result};
use crate::math::parse_math;
use crate::resolve::ImageDataMap;
use nom::{
    character::complete::{digit1, multispace0},
    sequence::preceded,
    IResult,
};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Numbering reference used by ordered-list paragraphs.
pub const ORDERED_LIST_REF: &str = "ordered";

/// Indentation unit in inches, per blockquote or list level.
pub const INDENT: f64 = 0.5;

/// Inline decorations active for a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub strong: bool,
    pub emphasis: bool,
    pub delete: bool,
}

/// The innermost list enclosing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListInfo {
    /// Nesting depth, 0 for a top-level list.
    pub level: u32,
    pub ordered: bool,
    /// Task-list state of the current item.
    pub checked: Option<bool>,
}

/// State threaded down the recursion.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub deco: Decoration,
    pub images: &'a ImageDataMap,
    /// Blockquote nesting depth.
    pub indent: u32,
    pub list: Option<ListInfo>,
    pub table_style: Option<&'a TableStyle>,
}

impl<'a> Context<'a> {
    pub fn new(images: &'a ImageDataMap) -> Self {
        Self {
            deco: Decoration::default(),
            images,
            indent: 0,
            list: None,
            table_style: None,
        }
    }

    pub fn with_table_style(self, table_style: Option<&'a TableStyle>) -> Self {
        Self {
            table_style,
            ..self
        }
    }
}

/// One converted item, not yet placed in a block or inline container.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Paragraph(Paragraph),
    Table(docx::Table),
    Inline(ParagraphChild),
}

/// Output of [`convert_nodes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    pub nodes: Vec<Content>,
    /// Footnote bodies keyed by mdast identifier.
    pub footnotes: BTreeMap<String, Footnote>,
    /// Footnote ids referenced by the content, with the identifier that
    /// first produced each.
    pub references: BTreeMap<u32, String>,
}

/// Convert a node list under `ctx`.
pub fn convert_nodes(nodes: &[Node], ctx: &Context<'_>) -> Result<Converted> {
    let mut converter = Converter::default();
    let nodes = converter.nodes(nodes, *ctx)?;
    Ok(Converted {
        nodes,
        footnotes: converter.footnotes,
        references: converter.references,
    })
}

/// Parse a footnote identifier into a numeric id, reading its leading digits.
///
/// Id 0 belongs to the continuation separator and is rejected.
pub fn footnote_id(identifier: &str) -> Result<u32> {
    let parsed: IResult<&str, &str> = preceded(multispace0, digit1)(identifier);
    parsed
        .ok()
        .and_then(|(_, digits)| digits.parse().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ConvertError::InvalidFootnoteId(identifier.to_string()).into())
}

/// Place converted content in block position. Consecutive inline items are
/// wrapped in a paragraph.
pub fn into_blocks(contents: Vec<Content>) -> Vec<BodyChild> {
    let mut blocks = Vec::new();
    let mut loose = Vec::new();
    for content in contents {
        match content {
            Content::Inline(child) => loose.push(child),
            Content::Paragraph(p) => {
                flush_loose(&mut blocks, &mut loose);
                blocks.push(BodyChild::Paragraph(p));
            }
            Content::Table(t) => {
                flush_loose(&mut blocks, &mut loose);
                blocks.push(BodyChild::Table(t));
            }
        }
    }
    flush_loose(&mut blocks, &mut loose);
    blocks
}

fn flush_loose(blocks: &mut Vec<BodyChild>, loose: &mut Vec<ParagraphChild>) {
    if !loose.is_empty() {
        blocks.push(BodyChild::Paragraph(Paragraph::new(std::mem::take(loose))));
    }
}

/// Place converted content in inline position. Paragraphs and tables are
/// flattened to their runs.
pub fn into_inlines(contents: Vec<Content>) -> Vec<ParagraphChild> {
    let mut inlines = Vec::new();
    for content in contents {
        match content {
            Content::Inline(child) => inlines.push(child),
            Content::Paragraph(p) => {
                trace!("paragraph flattened into inline content");
                inlines.extend(p.children);
            }
            Content::Table(t) => {
                warn!(rows = t.rows.len(), "table flattened into inline content");
                inlines.extend(table_inlines(t));
            }
        }
    }
    inlines
}

fn table_inlines(table: docx::Table) -> Vec<ParagraphChild> {
    let mut inlines = Vec::new();
    for cell in table.rows.into_iter().flat_map(|r| r.cells) {
        for child in cell.children {
            match child {
                BodyChild::Paragraph(p) => inlines.extend(p.children),
                BodyChild::Table(t) => inlines.extend(table_inlines(t)),
            }
        }
    }
    inlines
}

fn text_run(text: &str, deco: Decoration) -> TextRun {
    TextRun {
        text: text.to_string(),
        bold: deco.strong,
        italics: deco.emphasis,
        strike: deco.delete,
        breaks: 0,
    }
}

/// A literal value as undecorated runs, one line break between lines.
fn literal_paragraph(value: &str) -> Paragraph {
    let children = value
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            ParagraphChild::Text(TextRun {
                breaks: u32::from(i > 0),
                ..TextRun::new(line)
            })
        })
        .collect();
    Paragraph::new(children)
}

fn heading_level(depth: u8) -> Option<HeadingLevel> {
    match depth {
        1 => Some(HeadingLevel::Title),
        2 => Some(HeadingLevel::Heading1),
        3 => Some(HeadingLevel::Heading2),
        4 => Some(HeadingLevel::Heading3),
        5 => Some(HeadingLevel::Heading4),
        6 => Some(HeadingLevel::Heading5),
        _ => None,
    }
}

fn column_alignment(align: Option<AlignKind>) -> Alignment {
    match align {
        Some(AlignKind::Right) => Alignment::Right,
        Some(AlignKind::Center) => Alignment::Center,
        Some(AlignKind::Left) | None => Alignment::Left,
    }
}

#[derive(Debug, Default)]
struct Converter {
    footnotes: BTreeMap<String, Footnote>,
    references: BTreeMap<u32, String>,
}

impl Converter {
    fn nodes(&mut self, nodes: &[Node], ctx: Context<'_>) -> Result<Vec<Content>> {
        let mut results = Vec::new();
        for node in nodes {
            self.node(node, ctx, &mut results)?;
        }
        Ok(results)
    }

    fn inlines(&mut self, nodes: &[Node], ctx: Context<'_>) -> Result<Vec<ParagraphChild>> {
        Ok(into_inlines(self.nodes(nodes, ctx)?))
    }

    fn node(&mut self, node: &Node, ctx: Context<'_>, out: &mut Vec<Content>) -> Result<()> {
        match node {
            Node::Paragraph(p) => {
                out.push(Content::Paragraph(self.paragraph(&p.children, ctx)?));
            }
            Node::Heading(h) => out.push(Content::Paragraph(self.heading(h, ctx)?)),
            Node::ThematicBreak => out.push(Content::Paragraph(Paragraph::thematic_break())),
            Node::Blockquote(q) => {
                let ctx = Context {
                    indent: ctx.indent + 1,
                    ..ctx
                };
                out.extend(self.nodes(&q.children, ctx)?);
            }
            Node::List(list) => {
                let info = ListInfo {
                    level: ctx.list.map_or(0, |l| l.level + 1),
                    ordered: list.ordered.unwrap_or(false),
                    checked: None,
                };
                let ctx = Context {
                    list: Some(info),
                    ..ctx
                };
                for child in &list.children {
                    match child {
                        Node::ListItem(item) => out.extend(self.list_item(item, ctx)?),
                        other => self.node(other, ctx, out)?,
                    }
                }
            }
            Node::Table(table) => out.push(Content::Table(self.table(table, ctx)?)),
            Node::Html(Literal { value }) => out.push(Content::Paragraph(literal_paragraph(value))),
            Node::Code(Code { value, .. }) => {
                out.push(Content::Paragraph(literal_paragraph(value)))
            }
            Node::FootnoteDefinition(def) => self.footnote_definition(def, ctx)?,
            Node::Text(Literal { value }) => {
                out.push(Content::Inline(ParagraphChild::Text(text_run(value, ctx.deco))))
            }
            Node::Emphasis(p) | Node::Strong(p) | Node::Delete(p) => {
                let mut deco = ctx.deco;
                match node {
                    Node::Emphasis(_) => deco.emphasis = true,
                    Node::Strong(_) => deco.strong = true,
                    _ => deco.delete = true,
                }
                out.extend(self.nodes(&p.children, Context { deco, ..ctx })?);
            }
            Node::InlineCode(Literal { value }) => {
                out.push(Content::Inline(ParagraphChild::Text(text_run(value, ctx.deco))))
            }
            Node::Break => out.push(Content::Inline(ParagraphChild::Text(TextRun::line_break()))),
            Node::Link(link) => {
                let children = self.inlines(&link.children, ctx)?;
                out.push(Content::Inline(ParagraphChild::Hyperlink(ExternalHyperlink {
                    link: link.url.clone(),
                    children,
                })));
            }
            Node::Image(image) => {
                let data = ctx
                    .images
                    .get(&image.url)
                    .ok_or_else(|| ResolutionError::ImageNotResolved(image.url.clone()))?;
                out.push(Content::Inline(ParagraphChild::Image(ImageRun {
                    data: data.image.clone(),
                    width: data.width,
                    height: data.height,
                })));
            }
            Node::Footnote(p) => {
                let children = self.inlines(&p.children, ctx)?;
                out.push(Content::Paragraph(Paragraph::new(children)));
            }
            Node::FootnoteReference(r) => {
                let id = footnote_id(&r.identifier)?;
                self.references
                    .entry(id)
                    .or_insert_with(|| r.identifier.clone());
                out.push(Content::Inline(ParagraphChild::FootnoteReference(id)));
            }
            Node::Math(Literal { value }) => {
                for runs in parse_math(value) {
                    out.push(Content::Paragraph(Paragraph::new(vec![ParagraphChild::Math(
                        Math { children: runs },
                    )])));
                }
            }
            Node::InlineMath(Literal { value }) => {
                let children = parse_math(value).into_iter().flatten().collect();
                out.push(Content::Inline(ParagraphChild::Math(Math { children })));
            }
            Node::Yaml(_)
            | Node::Toml(_)
            | Node::Definition(_)
            | Node::LinkReference(_)
            | Node::ImageReference(_) => {
                trace!(kind = node.kind(), "skipping unsupported node");
            }
            Node::Root(_) | Node::ListItem(_) | Node::TableRow(_) | Node::TableCell(_) => {
                return Err(ConvertError::UnexpectedNode(node.kind()).into());
            }
            Node::Unknown => return Err(ConvertError::UnknownNode.into()),
        }
        Ok(())
    }

    fn paragraph(&mut self, children: &[Node], ctx: Context<'_>) -> Result<Paragraph> {
        let mut runs = self.inlines(children, ctx)?;
        if let Some(checked) = ctx.list.and_then(|l| l.checked) {
            runs.insert(0, ParagraphChild::CheckBox(CheckBox { checked }));
        }

        let indent = (ctx.indent > 0).then(|| convert_inches_to_twip(INDENT * f64::from(ctx.indent)));
        let numbering = ctx.list.map(|l| {
            if l.ordered {
                Numbering::Ordered {
                    reference: ORDERED_LIST_REF.to_string(),
                    level: l.level,
                }
            } else {
                Numbering::Bullet { level: l.level }
            }
        });

        Ok(Paragraph {
            indent,
            numbering,
            ..Paragraph::new(runs)
        })
    }

    fn heading(&mut self, heading: &Heading, ctx: Context<'_>) -> Result<Paragraph> {
        Ok(Paragraph {
            heading: heading_level(heading.depth),
            ..Paragraph::new(self.inlines(&heading.children, ctx)?)
        })
    }

    fn list_item(&mut self, item: &ListItem, ctx: Context<'_>) -> Result<Vec<Content>> {
        let ctx = Context {
            list: ctx.list.map(|l| ListInfo {
                checked: item.checked,
                ..l
            }),
            ..ctx
        };
        self.nodes(&item.children, ctx)
    }

    fn table(&mut self, table: &crate::ast::Table, ctx: Context<'_>) -> Result<docx::Table> {
        let style = ctx.table_style;
        let mut rows = Vec::with_capacity(table.children.len());

        for (i, row) in table.children.iter().enumerate() {
            let Node::TableRow(row) = row else {
                warn!(kind = row.kind(), "skipping non-row node in table");
                continue;
            };
            let part = style.and_then(|s| if i == 0 { s.header.as_ref() } else { s.body.as_ref() });
            rows.push(self.table_row(&row.children, &table.align, part, ctx)?);
        }

        Ok(docx::Table {
            rows,
            options: style.and_then(|s| s.options.clone()),
        })
    }

    fn table_row(
        &mut self,
        cells: &[Node],
        align: &[Option<AlignKind>],
        part: Option<&TablePartStyle>,
        ctx: Context<'_>,
    ) -> Result<TableRow> {
        let mut row = TableRow {
            cells: Vec::with_capacity(cells.len()),
            properties: part.map(|p| p.row.clone()),
        };

        for (i, cell) in cells.iter().enumerate() {
            let Node::TableCell(cell) = cell else {
                warn!(kind = cell.kind(), "skipping non-cell node in table row");
                continue;
            };
            let alignment = align.get(i).map(|a| column_alignment(*a));
            let paragraph = Paragraph {
                alignment,
                properties: part.map(|p| p.paragraph.clone()),
                ..Paragraph::new(self.inlines(&cell.children, ctx)?)
            };
            row.cells.push(TableCell {
                children: vec![BodyChild::Paragraph(paragraph)],
                properties: part.map(|p| p.cell.clone()),
            });
        }
        Ok(row)
    }

    fn footnote_definition(&mut self, def: &FootnoteDefinition, ctx: Context<'_>) -> Result<()> {
        let mut children = Vec::new();
        for node in &def.children {
            for block in into_blocks(self.nodes(std::slice::from_ref(node), ctx)?) {
                match block {
                    BodyChild::Paragraph(p) => children.push(p),
                    BodyChild::Table(t) => {
                        warn!(identifier = %def.identifier, "table in footnote flattened");
                        children.push(Paragraph::new(table_inlines(t)));
                    }
                }
            }
        }
        self.footnotes
            .insert(def.identifier.clone(), Footnote { children });
        Ok(())
    }
}
