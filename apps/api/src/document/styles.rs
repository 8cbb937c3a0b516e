use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::document::package::STYLES_PART;
use crate::document::DocumentFormatError;

pub const HEADING_STYLE: &str = "Heading2";
pub const BULLET_STYLE: &str = "ListBullet";

/// Paragraph style ids declared by a document's `word/styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    ids: HashSet<String>,
}

impl StyleCatalog {
    pub fn parse(xml: &str) -> Result<Self, DocumentFormatError> {
        let mut reader = Reader::from_str(xml);
        let mut ids = HashSet::new();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:style" => {
                    if let Some(attr) = e.try_get_attribute("w:styleId").map_err(xml_error)? {
                        ids.insert(attr.unescape_value().map_err(xml_error)?.into_owned());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { ids })
    }

    pub fn has(&self, style_id: &str) -> bool {
        self.ids.contains(style_id)
    }
}

fn xml_error(e: impl std::fmt::Display) -> DocumentFormatError {
    DocumentFormatError::Xml {
        part: STYLES_PART,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::STYLES_WITH_LISTS;

    #[test]
    fn test_collects_style_ids() {
        let catalog = StyleCatalog::parse(STYLES_WITH_LISTS).unwrap();
        assert!(catalog.has(HEADING_STYLE));
        assert!(catalog.has(BULLET_STYLE));
        assert!(!catalog.has("Title"));
    }

    #[test]
    fn test_default_catalog_is_empty() {
        assert!(!StyleCatalog::default().has(HEADING_STYLE));
    }

    #[test]
    fn test_malformed_styles_fail() {
        let err = StyleCatalog::parse("<w:styles><w:style></w:styles>").unwrap_err();
        assert!(matches!(err, DocumentFormatError::Xml { .. }));
    }
}
