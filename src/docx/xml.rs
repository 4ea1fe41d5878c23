//! WordprocessingML and Office Math serialization of the object model.

use super::packer::image_extension;
use super::{
    BodyChild, CellProperties, CoreProperties, Document, ExternalHyperlink, Footnote, ImageRun,
    LevelFormat, MathRun, NumberingConfig, NumberingLevel, Paragraph, ParagraphChild,
    ParagraphStyle, RowProperties, StyleSheet, Table, TableOptions, TextRun, Numbering,
    Alignment,
};
use std::collections::BTreeMap;
use std::fmt::Write;

const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
    r#"mc:Ignorable="w14""#,
);

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_FOOTNOTES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
const REL_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// Numbering instance used by every bulleted paragraph.
const BULLET_NUM_ID: u32 = 1;

/// Deepest level of the bullet definition.
const BULLET_MAX_LEVEL: u32 = 8;

/// EMU per pixel at 96 dpi.
const EMU_PER_PIXEL: u64 = 9525;

/// Escape text for element content and attribute values. Control characters
/// that XML 1.0 cannot represent are dropped.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\t' | '\n' | '\r' => out.push(ch),
            '\u{0}'..='\u{1F}' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// A package relationship from one part to another part or an external URL.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relationship {
    pub id: String,
    pub kind: &'static str,
    pub target: String,
    pub external: bool,
}

/// An image file stored under `word/media/`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Media {
    pub name: String,
    pub data: Vec<u8>,
}

/// A registered numbering instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberingRef {
    pub num_id: u32,
    /// Deepest level the definition declares.
    pub max_level: u32,
}

/// State shared by every part written for one package.
#[derive(Debug, Default)]
pub(crate) struct PackageState {
    pub media: Vec<Media>,
    /// Numbering instances by reference.
    pub numbering: BTreeMap<String, NumberingRef>,
    next_drawing_id: u32,
}

/// Writer for a part holding body content (`document.xml`, `footnotes.xml`).
struct PartWriter<'a> {
    out: String,
    rels: Vec<Relationship>,
    next_rel: u32,
    state: &'a mut PackageState,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunFormat {
    bold: bool,
    hyperlink: bool,
}

impl<'a> PartWriter<'a> {
    fn new(state: &'a mut PackageState, rels: Vec<Relationship>) -> Self {
        let next_rel = rels.len() as u32 + 1;
        Self {
            out: String::new(),
            rels,
            next_rel,
            state,
        }
    }

    fn add_rel(&mut self, kind: &'static str, target: String, external: bool) -> String {
        let id = format!("rId{}", self.next_rel);
        self.next_rel += 1;
        self.rels.push(Relationship {
            id: id.clone(),
            kind,
            target,
            external,
        });
        id
    }

    fn body_child(&mut self, child: &BodyChild) {
        match child {
            BodyChild::Paragraph(p) => self.paragraph(p, None, None),
            BodyChild::Table(t) => self.table(t),
        }
    }

    /// Write a paragraph. `style` overrides the paragraph style and `prefix`
    /// is raw run markup inserted before the children.
    fn paragraph(&mut self, p: &Paragraph, style: Option<&str>, prefix: Option<&str>) {
        self.out.push_str("<w:p>");
        self.paragraph_properties(p, style);
        if let Some(prefix) = prefix {
            self.out.push_str(prefix);
        }
        let format = RunFormat {
            bold: p.properties.as_ref().is_some_and(|pp| pp.bold),
            hyperlink: false,
        };
        for child in &p.children {
            self.paragraph_child(child, format);
        }
        self.out.push_str("</w:p>");
    }

    fn paragraph_properties(&mut self, p: &Paragraph, style: Option<&str>) {
        let mut props = String::new();
        let extra = p.properties.as_ref();

        let style = style
            .or(p.heading.map(|h| h.style_id()))
            .or(extra.and_then(|pp| pp.style.as_deref()));
        if let Some(style) = style {
            let _ = write!(props, r#"<w:pStyle w:val="{}"/>"#, escape(style));
        }

        let num = match &p.numbering {
            Some(Numbering::Ordered { reference, level }) => {
                self.state
                    .numbering
                    .get(reference)
                    .map(|num| (num.num_id, (*level).min(num.max_level)))
            }
            Some(Numbering::Bullet { level }) => {
                Some((BULLET_NUM_ID, (*level).min(BULLET_MAX_LEVEL)))
            }
            None => None,
        };
        if let Some((num_id, level)) = num {
            let _ = write!(
                props,
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                level, num_id
            );
        }

        if p.thematic_break {
            props.push_str(
                r#"<w:pBdr><w:bottom w:val="single" w:color="auto" w:space="1" w:sz="6"/></w:pBdr>"#,
            );
        }

        if let Some(pp) = extra {
            if pp.spacing_before.is_some() || pp.spacing_after.is_some() {
                props.push_str("<w:spacing");
                if let Some(before) = pp.spacing_before {
                    let _ = write!(props, r#" w:before="{}""#, before);
                }
                if let Some(after) = pp.spacing_after {
                    let _ = write!(props, r#" w:after="{}""#, after);
                }
                props.push_str("/>");
            }
        }

        if let Some(indent) = p.indent {
            let _ = write!(props, r#"<w:ind w:left="{}"/>"#, indent);
        }

        if let Some(alignment) = p.alignment.or(extra.and_then(|pp| pp.alignment)) {
            let _ = write!(props, r#"<w:jc w:val="{}"/>"#, alignment.as_str());
        }

        if !props.is_empty() {
            self.out.push_str("<w:pPr>");
            self.out.push_str(&props);
            self.out.push_str("</w:pPr>");
        }
    }

    fn paragraph_child(&mut self, child: &ParagraphChild, format: RunFormat) {
        match child {
            ParagraphChild::Text(run) => self.text_run(run, format),
            ParagraphChild::Image(image) => self.image_run(image),
            ParagraphChild::Hyperlink(link) => self.hyperlink(link, format),
            ParagraphChild::Math(math) => {
                self.out.push_str("<m:oMath>");
                for run in &math.children {
                    self.math_run(run);
                }
                self.out.push_str("</m:oMath>");
            }
            ParagraphChild::CheckBox(checkbox) => {
                let _ = write!(
                    self.out,
                    concat!(
                        "<w:sdt><w:sdtPr><w14:checkbox>",
                        r#"<w14:checked w14:val="{}"/>"#,
                        r#"<w14:checkedState w14:font="MS Gothic" w14:val="{:04X}"/>"#,
                        r#"<w14:uncheckedState w14:font="MS Gothic" w14:val="{:04X}"/>"#,
                        "</w14:checkbox></w:sdtPr><w:sdtContent><w:r><w:rPr>",
                        r#"<w:rFonts w:ascii="MS Gothic" w:eastAsia="MS Gothic" w:hAnsi="MS Gothic"/>"#,
                        "</w:rPr><w:t>{}</w:t></w:r></w:sdtContent></w:sdt>"
                    ),
                    u8::from(checkbox.checked),
                    super::CheckBox::CHECKED_STATE as u32,
                    super::CheckBox::UNCHECKED_STATE as u32,
                    checkbox.glyph()
                );
            }
            ParagraphChild::FootnoteReference(id) => {
                let _ = write!(
                    self.out,
                    r#"<w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteReference w:id="{}"/></w:r>"#,
                    id
                );
            }
        }
    }

    fn text_run(&mut self, run: &TextRun, format: RunFormat) {
        self.out.push_str("<w:r>");

        let mut props = String::new();
        if format.hyperlink {
            props.push_str(r#"<w:rStyle w:val="Hyperlink"/>"#);
        }
        if run.bold || format.bold {
            props.push_str("<w:b/><w:bCs/>");
        }
        if run.italics {
            props.push_str("<w:i/><w:iCs/>");
        }
        if run.strike {
            props.push_str("<w:strike/>");
        }
        if !props.is_empty() {
            self.out.push_str("<w:rPr>");
            self.out.push_str(&props);
            self.out.push_str("</w:rPr>");
        }

        for _ in 0..run.breaks {
            self.out.push_str("<w:br/>");
        }
        if !run.text.is_empty() {
            let _ = write!(
                self.out,
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape(&run.text)
            );
        }
        self.out.push_str("</w:r>");
    }

    fn hyperlink(&mut self, link: &ExternalHyperlink, format: RunFormat) {
        let id = self.add_rel(REL_HYPERLINK, link.link.clone(), true);
        let _ = write!(self.out, r#"<w:hyperlink r:id="{}" w:history="1">"#, id);
        let format = RunFormat {
            hyperlink: true,
            ..format
        };
        for child in &link.children {
            self.paragraph_child(child, format);
        }
        self.out.push_str("</w:hyperlink>");
    }

    fn image_run(&mut self, image: &ImageRun) {
        let index = self.state.media.len() + 1;
        let name = format!("image{}.{}", index, image_extension(&image.data));
        self.state.media.push(Media {
            name: name.clone(),
            data: image.data.clone(),
        });
        let rel = self.add_rel(REL_IMAGE, format!("media/{}", name), false);

        self.state.next_drawing_id += 1;
        let drawing_id = self.state.next_drawing_id;
        let cx = u64::from(image.width) * EMU_PER_PIXEL;
        let cy = u64::from(image.height) * EMU_PER_PIXEL;

        let _ = write!(
            self.out,
            concat!(
                "<w:r><w:drawing>",
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
                r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                "</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"
            ),
            cx = cx,
            cy = cy,
            id = drawing_id,
            name = name,
            rel = rel,
        );
    }

    fn math_runs(&mut self, runs: &[MathRun]) {
        for run in runs {
            self.math_run(run);
        }
    }

    fn math_run(&mut self, run: &MathRun) {
        match run {
            MathRun::Run(text) => {
                let _ = write!(
                    self.out,
                    r#"<m:r><w:rPr><w:rFonts w:ascii="Cambria Math" w:hAnsi="Cambria Math"/></w:rPr><m:t xml:space="preserve">{}</m:t></m:r>"#,
                    escape(text)
                );
            }
            MathRun::SuperScript { base, script } => {
                self.out.push_str("<m:sSup><m:e>");
                self.math_runs(base);
                self.out.push_str("</m:e><m:sup>");
                self.math_runs(script);
                self.out.push_str("</m:sup></m:sSup>");
            }
            MathRun::SubScript { base, script } => {
                self.out.push_str("<m:sSub><m:e>");
                self.math_runs(base);
                self.out.push_str("</m:e><m:sub>");
                self.math_runs(script);
                self.out.push_str("</m:sub></m:sSub>");
            }
            MathRun::Fraction {
                numerator,
                denominator,
            } => {
                self.out.push_str("<m:f><m:num>");
                self.math_runs(numerator);
                self.out.push_str("</m:num><m:den>");
                self.math_runs(denominator);
                self.out.push_str("</m:den></m:f>");
            }
            MathRun::Radical { body, degree } => {
                self.out.push_str("<m:rad>");
                match degree {
                    Some(degree) => {
                        self.out.push_str("<m:deg>");
                        self.math_runs(degree);
                        self.out.push_str("</m:deg>");
                    }
                    None => {
                        self.out
                            .push_str(r#"<m:radPr><m:degHide m:val="1"/></m:radPr><m:deg/>"#);
                    }
                }
                self.out.push_str("<m:e>");
                self.math_runs(body);
                self.out.push_str("</m:e></m:rad>");
            }
            MathRun::Sum(body) => {
                self.out.push_str(concat!(
                    "<m:nary><m:naryPr>",
                    r#"<m:chr m:val="∑"/><m:limLoc m:val="undOvr"/>"#,
                    r#"<m:subHide m:val="1"/><m:supHide m:val="1"/>"#,
                    "</m:naryPr><m:sub/><m:sup/><m:e>"
                ));
                self.math_runs(body);
                self.out.push_str("</m:e></m:nary>");
            }
        }
    }

    fn table(&mut self, table: &Table) {
        self.out.push_str("<w:tbl><w:tblPr>");
        self.table_properties(table.options.as_ref());
        self.out.push_str("</w:tblPr><w:tblGrid>");
        let columns = table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        for _ in 0..columns {
            self.out.push_str("<w:gridCol/>");
        }
        self.out.push_str("</w:tblGrid>");

        for row in &table.rows {
            self.out.push_str("<w:tr>");
            if let Some(props) = &row.properties {
                self.row_properties(props);
            }
            for cell in &row.cells {
                self.out.push_str("<w:tc>");
                if let Some(props) = &cell.properties {
                    self.cell_properties(props);
                }
                if cell.children.is_empty() {
                    self.out.push_str("<w:p/>");
                }
                for child in &cell.children {
                    self.body_child(child);
                }
                self.out.push_str("</w:tc>");
            }
            self.out.push_str("</w:tr>");
        }
        self.out.push_str("</w:tbl>");
    }

    fn table_properties(&mut self, options: Option<&TableOptions>) {
        if let Some(style) = options.and_then(|o| o.style.as_deref()) {
            let _ = write!(self.out, r#"<w:tblStyle w:val="{}"/>"#, escape(style));
        }
        match options.and_then(|o| o.width) {
            Some(width) => {
                let _ = write!(
                    self.out,
                    r#"<w:tblW w:w="{}" w:type="{}"/>"#,
                    width.size,
                    width.kind.as_str()
                );
            }
            None => self.out.push_str(r#"<w:tblW w:w="0" w:type="auto"/>"#),
        }
        self.out.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            let _ = write!(
                self.out,
                r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
                side
            );
        }
        self.out.push_str("</w:tblBorders>");
        if let Some(layout) = options.and_then(|o| o.layout) {
            let _ = write!(self.out, r#"<w:tblLayout w:type="{}"/>"#, layout.as_str());
        }
    }

    fn row_properties(&mut self, props: &RowProperties) {
        let mut inner = String::new();
        if props.cant_split {
            inner.push_str("<w:cantSplit/>");
        }
        if let Some(height) = props.height {
            let _ = write!(inner, r#"<w:trHeight w:val="{}"/>"#, height);
        }
        if props.table_header {
            inner.push_str("<w:tblHeader/>");
        }
        if !inner.is_empty() {
            let _ = write!(self.out, "<w:trPr>{}</w:trPr>", inner);
        }
    }

    fn cell_properties(&mut self, props: &CellProperties) {
        let mut inner = String::new();
        if let Some(width) = props.width {
            let _ = write!(
                inner,
                r#"<w:tcW w:w="{}" w:type="{}"/>"#,
                width.size,
                width.kind.as_str()
            );
        }
        if let Some(fill) = &props.shading {
            let _ = write!(
                inner,
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                escape(fill)
            );
        }
        if let Some(valign) = props.vertical_align {
            let _ = write!(inner, r#"<w:vAlign w:val="{}"/>"#, valign.as_str());
        }
        if !inner.is_empty() {
            let _ = write!(self.out, "<w:tcPr>{}</w:tcPr>", inner);
        }
    }

    fn footnote(&mut self, id: u32, footnote: &Footnote) {
        const REF_MARK: &str =
            r#"<w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteRef/></w:r>"#;

        let _ = write!(self.out, r#"<w:footnote w:id="{}">"#, id);
        if footnote.children.is_empty() {
            self.paragraph(&Paragraph::default(), Some("FootnoteText"), Some(REF_MARK));
        }
        for (i, p) in footnote.children.iter().enumerate() {
            let prefix = (i == 0).then_some(REF_MARK);
            self.paragraph(p, Some("FootnoteText"), prefix);
        }
        self.out.push_str("</w:footnote>");
    }
}

/// Fixed relationships of `document.xml`, in `rId` order.
fn document_base_rels() -> Vec<Relationship> {
    [
        (REL_STYLES, "styles.xml"),
        (REL_NUMBERING, "numbering.xml"),
        (REL_FOOTNOTES, "footnotes.xml"),
        (REL_SETTINGS, "settings.xml"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (kind, target))| Relationship {
        id: format!("rId{}", i + 1),
        kind,
        target: target.to_string(),
        external: false,
    })
    .collect()
}

/// Write `word/document.xml` and its relationships.
pub(crate) fn document_xml(doc: &Document, state: &mut PackageState) -> (String, Vec<Relationship>) {
    let mut writer = PartWriter::new(state, document_base_rels());
    let _ = write!(writer.out, "{}<w:document {}>", XML_DECLARATION, NAMESPACES);
    if let Some(background) = &doc.background {
        let _ = write!(
            writer.out,
            r#"<w:background w:color="{}"/>"#,
            escape(&background.color)
        );
    }
    writer.out.push_str("<w:body>");
    for section in &doc.sections {
        for child in &section.children {
            writer.body_child(child);
        }
    }
    writer.out.push_str(concat!(
        "<w:sectPr>",
        r#"<w:pgSz w:w="11906" w:h="16838"/>"#,
        r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
        "</w:sectPr></w:body></w:document>"
    ));
    (writer.out, writer.rels)
}

/// Write `word/footnotes.xml` and its relationships.
pub(crate) fn footnotes_xml(doc: &Document, state: &mut PackageState) -> (String, Vec<Relationship>) {
    let mut writer = PartWriter::new(state, Vec::new());
    let _ = write!(writer.out, "{}<w:footnotes {}>", XML_DECLARATION, NAMESPACES);
    writer.out.push_str(concat!(
        r#"<w:footnote w:type="separator" w:id="-1"><w:p><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:r><w:separator/></w:r></w:p></w:footnote>"#,
        r#"<w:footnote w:type="continuationSeparator" w:id="0"><w:p><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:r><w:continuationSeparator/></w:r></w:p></w:footnote>"#,
    ));
    for (id, footnote) in &doc.footnotes {
        writer.footnote(*id, footnote);
    }
    writer.out.push_str("</w:footnotes>");
    (writer.out, writer.rels)
}

fn default_bullet_levels() -> Vec<NumberingLevel> {
    const GLYPHS: [&str; 3] = ["\u{25CF}", "\u{25CB}", "\u{25A0}"];
    (0..=BULLET_MAX_LEVEL)
        .map(|level| NumberingLevel {
            level,
            format: LevelFormat::Bullet,
            text: GLYPHS[level as usize % GLYPHS.len()].to_string(),
            alignment: Alignment::Left,
            indent: Some(720 * (level + 1)),
        })
        .collect()
}

fn abstract_num(out: &mut String, id: usize, levels: &[NumberingLevel]) {
    let _ = write!(
        out,
        r#"<w:abstractNum w:abstractNumId="{}"><w:multiLevelType w:val="hybridMultilevel"/>"#,
        id
    );
    for level in levels {
        let _ = write!(
            out,
            r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="{}"/><w:lvlText w:val="{}"/><w:lvlJc w:val="{}"/>"#,
            level.level,
            level.format.as_str(),
            escape(&level.text),
            level.alignment.as_str()
        );
        match (level.format, level.indent) {
            (LevelFormat::Bullet, Some(indent)) => {
                let _ = write!(
                    out,
                    r#"<w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr>"#,
                    indent
                );
            }
            (_, Some(indent)) => {
                let _ = write!(out, r#"<w:pPr><w:ind w:left="{}"/></w:pPr>"#, indent);
            }
            (_, None) => {}
        }
        out.push_str("</w:lvl>");
    }
    out.push_str("</w:abstractNum>");
}

/// Write `word/numbering.xml`, returning the instance for every reference.
pub(crate) fn numbering_xml(
    configs: &[NumberingConfig],
) -> (String, BTreeMap<String, NumberingRef>) {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"{}<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        XML_DECLARATION
    );

    abstract_num(&mut out, 0, &default_bullet_levels());
    for (i, config) in configs.iter().enumerate() {
        abstract_num(&mut out, i + 1, &config.levels);
    }

    let mut ids = BTreeMap::new();
    let _ = write!(
        out,
        r#"<w:num w:numId="{}"><w:abstractNumId w:val="0"/></w:num>"#,
        BULLET_NUM_ID
    );
    for (i, config) in configs.iter().enumerate() {
        let num_id = BULLET_NUM_ID + 1 + i as u32;
        let _ = write!(
            out,
            r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/></w:num>"#,
            num_id,
            i + 1
        );
        let max_level = config.levels.iter().map(|l| l.level).max().unwrap_or(0);
        ids.insert(config.reference.clone(), NumberingRef { num_id, max_level });
    }
    out.push_str("</w:numbering>");
    (out, ids)
}

fn builtin_paragraph_styles() -> Vec<ParagraphStyle> {
    let heading = |level: u8, size: u32| ParagraphStyle {
        id: format!("Heading{}", level),
        name: format!("heading {}", level),
        based_on: Some("Normal".into()),
        next: Some("Normal".into()),
        bold: true,
        size: Some(size),
        color: Some("2E74B5".into()),
        outline_level: Some(level - 1),
        ..ParagraphStyle::default()
    };

    vec![
        ParagraphStyle {
            id: "Title".into(),
            name: "Title".into(),
            based_on: Some("Normal".into()),
            next: Some("Normal".into()),
            size: Some(56),
            ..ParagraphStyle::default()
        },
        heading(1, 32),
        heading(2, 26),
        heading(3, 24),
        heading(4, 22),
        heading(5, 22),
        ParagraphStyle {
            id: "FootnoteText".into(),
            name: "footnote text".into(),
            based_on: Some("Normal".into()),
            size: Some(20),
            ..ParagraphStyle::default()
        },
    ]
}

fn paragraph_style(out: &mut String, style: &ParagraphStyle) {
    let _ = write!(
        out,
        r#"<w:style w:type="paragraph" w:styleId="{}"><w:name w:val="{}"/>"#,
        escape(&style.id),
        escape(&style.name)
    );
    if let Some(based_on) = &style.based_on {
        let _ = write!(out, r#"<w:basedOn w:val="{}"/>"#, escape(based_on));
    }
    if let Some(next) = &style.next {
        let _ = write!(out, r#"<w:next w:val="{}"/>"#, escape(next));
    }
    out.push_str("<w:qFormat/>");
    if let Some(level) = style.outline_level {
        let _ = write!(out, r#"<w:pPr><w:outlineLvl w:val="{}"/></w:pPr>"#, level);
    }

    let mut run = String::new();
    if let Some(font) = &style.font {
        let font = escape(font);
        let _ = write!(run, r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#, font);
    }
    if style.bold {
        run.push_str("<w:b/><w:bCs/>");
    }
    if style.italics {
        run.push_str("<w:i/><w:iCs/>");
    }
    if let Some(color) = &style.color {
        let _ = write!(run, r#"<w:color w:val="{}"/>"#, escape(color));
    }
    if let Some(size) = style.size {
        let _ = write!(run, r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size);
    }
    if !run.is_empty() {
        let _ = write!(out, "<w:rPr>{}</w:rPr>", run);
    }
    out.push_str("</w:style>");
}

/// Write `word/styles.xml`: built-in styles overlaid with the caller's sheet.
pub(crate) fn styles_xml(sheet: Option<&StyleSheet>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"{}<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        XML_DECLARATION
    );

    out.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
    if let Some(font) = sheet.and_then(|s| s.default_font.as_deref()) {
        let font = escape(font);
        let _ = write!(
            out,
            r#"<w:rFonts w:ascii="{0}" w:eastAsia="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            font
        );
    }
    if let Some(size) = sheet.and_then(|s| s.default_size) {
        let _ = write!(out, r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size);
    }
    out.push_str("</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>");

    out.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );

    let custom = sheet.map(|s| s.paragraph_styles.as_slice()).unwrap_or(&[]);
    for style in builtin_paragraph_styles()
        .iter()
        .filter(|b| !custom.iter().any(|c| c.id == b.id))
        .chain(custom.iter())
    {
        paragraph_style(&mut out, style);
    }

    out.push_str(concat!(
        r#"<w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style>"#,
        r#"<w:style w:type="character" w:styleId="FootnoteReference"><w:name w:val="footnote reference"/><w:rPr><w:vertAlign w:val="superscript"/></w:rPr></w:style>"#,
        "</w:styles>"
    ));
    out
}

/// Write `word/settings.xml`.
pub(crate) fn settings_xml(has_background: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"{}<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        XML_DECLARATION
    );
    if has_background {
        out.push_str("<w:displayBackgroundShape/>");
    }
    out.push_str(concat!(
        r#"<w:footnotePr><w:footnote w:id="-1"/><w:footnote w:id="0"/></w:footnotePr>"#,
        "</w:settings>"
    ));
    out
}

/// Write `docProps/core.xml`.
pub(crate) fn core_xml(props: &CoreProperties) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
        ),
        XML_DECLARATION
    );

    let fields = [
        ("dc:title", props.title.as_deref()),
        ("dc:subject", props.subject.as_deref()),
        ("dc:creator", props.creator.as_deref()),
        ("cp:keywords", props.keywords.as_deref()),
        ("dc:description", props.description.as_deref()),
        ("cp:lastModifiedBy", props.last_modified_by.as_deref()),
    ];
    for (tag, value) in fields {
        if let Some(value) = value {
            let _ = write!(out, "<{0}>{1}</{0}>", tag, escape(value));
        }
    }
    if let Some(revision) = props.revision {
        let _ = write!(out, "<cp:revision>{}</cp:revision>", revision);
    }
    out.push_str("</cp:coreProperties>");
    out
}

/// Write a `.rels` part.
pub(crate) fn relationships_xml(rels: &[Relationship]) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        XML_DECLARATION
    );
    for rel in rels {
        let _ = write!(
            out,
            r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
            rel.id,
            rel.kind,
            escape(&rel.target),
            if rel.external {
                r#" TargetMode="External""#
            } else {
                ""
            }
        );
    }
    out.push_str("</Relationships>");
    out
}

/// Write `[Content_Types].xml`.
pub(crate) fn content_types_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#,
        r#"<Default Extension="gif" ContentType="image/gif"/>"#,
        r#"<Default Extension="bmp" ContentType="image/bmp"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
        r#"<Override PartName="/word/footnotes.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml"/>"#,
        r#"<Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>"#,
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        "</Types>"
    )
}
