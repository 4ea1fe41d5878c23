//! Packaging a [`Document`] into an Office Open XML zip container.

use super::xml::{self, PackageState, Relationship};
use super::Document;
use crate::error::Result;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// MIME type of a `.docx` file.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Serialized document bytes labelled with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

/// Detect the file extension of an embedded image from its magic bytes.
///
/// Unrecognized data is stored as `png`.
pub(crate) fn image_extension(data: &[u8]) -> &'static str {
    match data {
        [0x89, b'P', b'N', b'G', ..] => "png",
        [0xFF, 0xD8, 0xFF, ..] => "jpeg",
        [b'G', b'I', b'F', b'8', ..] => "gif",
        [b'B', b'M', ..] => "bmp",
        _ => "png",
    }
}

/// Serializes documents into `.docx` packages.
pub struct Packer;

impl Packer {
    /// Pack the document into an in-memory zip archive.
    pub fn to_buffer(doc: &Document) -> Result<Vec<u8>> {
        let mut state = PackageState::default();

        let (numbering, ids) = xml::numbering_xml(&doc.numbering);
        state.numbering = ids;

        let (document, document_rels) = xml::document_xml(doc, &mut state);
        let (footnotes, footnote_rels) = xml::footnotes_xml(doc, &mut state);

        let root_rels = [
            Relationship {
                id: "rId1".into(),
                kind: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
                target: "word/document.xml".into(),
                external: false,
            },
            Relationship {
                id: "rId2".into(),
                kind: "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
                target: "docProps/core.xml".into(),
                external: false,
            },
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opt = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 9] = [
            ("[Content_Types].xml", xml::content_types_xml().to_string()),
            ("_rels/.rels", xml::relationships_xml(&root_rels)),
            ("docProps/core.xml", xml::core_xml(&doc.properties)),
            ("word/document.xml", document),
            (
                "word/_rels/document.xml.rels",
                xml::relationships_xml(&document_rels),
            ),
            ("word/styles.xml", xml::styles_xml(doc.styles.as_ref())),
            ("word/numbering.xml", numbering),
            ("word/footnotes.xml", footnotes),
            (
                "word/settings.xml",
                xml::settings_xml(doc.background.is_some()),
            ),
        ];
        for (name, content) in &parts {
            zip.start_file(*name, opt)?;
            zip.write_all(content.as_bytes())?;
        }

        if !footnote_rels.is_empty() {
            zip.start_file("word/_rels/footnotes.xml.rels", opt)?;
            zip.write_all(xml::relationships_xml(&footnote_rels).as_bytes())?;
        }

        for media in &state.media {
            zip.start_file(format!("word/media/{}", media.name), opt)?;
            zip.write_all(&media.data)?;
        }

        let buffer = zip.finish()?.into_inner();
        debug!(
            bytes = buffer.len(),
            media = state.media.len(),
            footnotes = doc.footnotes.len(),
            "packed docx"
        );
        Ok(buffer)
    }

    /// Pack the document and label it with the `.docx` MIME type.
    pub fn to_blob(doc: &Document) -> Result<Blob> {
        Ok(Blob {
            mime_type: DOCX_MIME_TYPE,
            data: Self::to_buffer(doc)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::{
        BodyChild, Footnote, ImageRun, Paragraph, ParagraphChild, Section, TextRun,
    };
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(buffer: &[u8], name: &str) -> Option<String> {
        let mut archive = ZipArchive::new(Cursor::new(buffer)).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        Some(content)
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(&[0x89, b'P', b'N', b'G', 0x0D]), "png");
        assert_eq!(image_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), "jpeg");
        assert_eq!(image_extension(b"GIF89a"), "gif");
        assert_eq!(image_extension(b"BM\0\0"), "bmp");
        assert_eq!(image_extension(b""), "png");
    }

    #[test]
    fn test_empty_document_has_required_parts() {
        let buffer = Packer::to_buffer(&Document::default()).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/numbering.xml",
            "word/footnotes.xml",
        ] {
            assert!(read_part(&buffer, part).is_some(), "missing {part}");
        }
        assert!(read_part(&buffer, "word/_rels/footnotes.xml.rels").is_none());
    }

    #[test]
    fn test_images_stored_as_media() {
        let doc = Document {
            sections: vec![Section {
                children: vec![BodyChild::Paragraph(Paragraph::new(vec![
                    ParagraphChild::Image(ImageRun {
                        data: vec![0xFF, 0xD8, 0xFF, 0xE0],
                        width: 10,
                        height: 20,
                    }),
                ]))],
            }],
            ..Document::default()
        };
        let buffer = Packer::to_buffer(&doc).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(buffer.as_slice())).unwrap();
        assert!(archive.by_name("word/media/image1.jpeg").is_ok());

        let document = read_part(&buffer, "word/document.xml").unwrap();
        assert!(document.contains(r#"<wp:extent cx="95250" cy="190500"/>"#));
        let rels = read_part(&buffer, "word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains(r#"Target="media/image1.jpeg""#));
    }

    #[test]
    fn test_footnotes_part() {
        let mut doc = Document::default();
        doc.footnotes.insert(
            1,
            Footnote {
                children: vec![Paragraph::new(vec![ParagraphChild::Text(TextRun::new(
                    "note",
                ))])],
            },
        );
        let buffer = Packer::to_buffer(&doc).unwrap();
        let footnotes = read_part(&buffer, "word/footnotes.xml").unwrap();
        assert!(footnotes.contains(r#"<w:footnote w:id="1">"#));
        assert!(footnotes.contains("<w:footnoteRef/>"));
        assert!(footnotes.contains(">note</w:t>"));
    }

    #[test]
    fn test_blob_mime_type() {
        let blob = Packer::to_blob(&Document::default()).unwrap();
        assert_eq!(blob.mime_type, DOCX_MIME_TYPE);
        assert_eq!(&blob.data[..2], b"PK");
    }
}
