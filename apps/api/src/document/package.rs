//! The .docx container: a zip archive of named XML parts.
//!
//! Every part is read into memory once, with per-part and whole-package size caps
//! so a crafted archive cannot inflate without bound. Writing re-emits the parts
//! in their original order.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::DocumentFormatError;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";

/// Maximum uncompressed size of a single part (50 MiB).
const MAX_PART_SIZE: u64 = 50 * 1024 * 1024;
/// Maximum uncompressed size of all parts together (200 MiB).
const MAX_PACKAGE_SIZE: u64 = 200 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct PackagePart {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<PackagePart>,
}

impl DocxPackage {
    pub fn read(bytes: &[u8]) -> Result<Self, DocumentFormatError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut total: u64 = 0;

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let declared = file.size();
            if declared > MAX_PART_SIZE {
                return Err(DocumentFormatError::TooLarge {
                    part: name,
                    size: declared,
                    limit: MAX_PART_SIZE,
                });
            }

            // Headers can lie about the size; the limited reader enforces it during inflation.
            let mut data = Vec::new();
            file.take(MAX_PART_SIZE + 1).read_to_end(&mut data)?;
            let size = data.len() as u64;
            if size > MAX_PART_SIZE {
                return Err(DocumentFormatError::TooLarge {
                    part: name,
                    size,
                    limit: MAX_PART_SIZE,
                });
            }

            total += size;
            if total > MAX_PACKAGE_SIZE {
                return Err(DocumentFormatError::TooLarge {
                    part: "(package)".to_string(),
                    size: total,
                    limit: MAX_PACKAGE_SIZE,
                });
            }

            parts.push(PackagePart { name, data });
        }

        if !parts.iter().any(|p| p.name == DOCUMENT_PART) {
            return Err(DocumentFormatError::MissingPart(DOCUMENT_PART));
        }

        debug!(parts = parts.len(), bytes = total, "Read document package");
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Reads a part as UTF-8 text.
    pub fn part_text(&self, name: &'static str) -> Result<Option<&str>, DocumentFormatError> {
        match self.part(name) {
            Some(data) => std::str::from_utf8(data)
                .map(Some)
                .map_err(|_| DocumentFormatError::Encoding(name.to_string())),
            None => Ok(None),
        }
    }

    /// Replaces the content of an existing part, or appends a new part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(PackagePart {
                name: name.to_string(),
                data,
            }),
        }
    }

    #[cfg(test)]
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn write(&self) -> Result<Vec<u8>, DocumentFormatError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(&part.data)?;
        }

        let bytes = writer.finish()?.into_inner();
        debug!(bytes = bytes.len(), "Wrote document package");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures;

    #[test]
    fn test_read_rejects_non_zip_bytes() {
        let err = DocxPackage::read(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, DocumentFormatError::Archive(_)));
    }

    #[test]
    fn test_read_requires_document_part() {
        let bytes = fixtures::docx_from_parts(&[("word/styles.xml", "<w:styles/>")]);
        let err = DocxPackage::read(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DocumentFormatError::MissingPart(DOCUMENT_PART)
        ));
    }

    #[test]
    fn test_write_preserves_part_order_and_content() {
        let bytes = fixtures::docx(&fixtures::paragraph("Hello"), None);
        let package = DocxPackage::read(&bytes).unwrap();
        let rewritten = DocxPackage::read(&package.write().unwrap()).unwrap();

        let names: Vec<&str> = rewritten.part_names().collect();
        assert_eq!(names, vec!["[Content_Types].xml", DOCUMENT_PART]);
        assert_eq!(rewritten.part(DOCUMENT_PART), package.part(DOCUMENT_PART));
    }

    #[test]
    fn test_set_part_replaces_or_appends() {
        let bytes = fixtures::docx(&fixtures::paragraph("Hello"), None);
        let mut package = DocxPackage::read(&bytes).unwrap();

        package.set_part(DOCUMENT_PART, b"<x/>".to_vec());
        package.set_part("word/extra.xml", b"<y/>".to_vec());

        assert_eq!(package.part(DOCUMENT_PART), Some(&b"<x/>"[..]));
        assert_eq!(package.part_names().count(), 3);
    }

    #[test]
    fn test_part_text_rejects_invalid_utf8() {
        let mut package =
            DocxPackage::read(&fixtures::docx(&fixtures::paragraph("x"), None)).unwrap();
        package.set_part(STYLES_PART, vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            package.part_text(STYLES_PART),
            Err(DocumentFormatError::Encoding(_))
        ));
    }
}
