//! ResumeDocument: the body paragraphs of a WordprocessingML document.
//!
//! # Editing model
//! The original `word/document.xml` is kept verbatim. Parsing records the byte span
//! of every top-level `<w:p>` in `<w:body>` plus its visible text, paragraph
//! properties and first run properties. Edits never touch the source string:
//! a rewritten paragraph carries replacement XML for its span, and appended
//! paragraphs are spliced in right before the body's trailing `<w:sectPr>` (or
//! `</w:body>`). Rendering copies every untouched span byte for byte.
//!
//! Paragraphs nested inside tables or text boxes are not part of the model and are
//! carried through unchanged.

use std::ops::Range;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::document::package::{DocxPackage, DOCUMENT_PART, STYLES_PART};
use crate::document::styles::StyleCatalog;
use crate::document::DocumentFormatError;

// ────────────────────────────────────────────────────────────────────────────
// Paragraphs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Origin {
    Source {
        span: Range<usize>,
        rewritten: Option<String>,
    },
    Appended {
        xml: String,
    },
}

/// One body paragraph: its visible text and the styling needed to rewrite it.
#[derive(Debug, Clone)]
pub struct Paragraph {
    text: String,
    style: Option<String>,
    open_tag: String,
    properties_xml: Option<String>,
    run_properties_xml: Option<String>,
    origin: Origin,
}

impl Paragraph {
    /// Visible text; tabs and breaks render as `\t` and `\n`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Paragraph style id (`w:pStyle`), if any.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    #[cfg(test)]
    pub fn is_appended(&self) -> bool {
        matches!(self.origin, Origin::Appended { .. })
    }

    #[cfg(test)]
    pub fn is_rewritten(&self) -> bool {
        matches!(
            self.origin,
            Origin::Source {
                rewritten: Some(_),
                ..
            }
        )
    }
}

/// A paragraph to append at the end of the body.
#[derive(Debug, Clone, Default)]
pub struct NewParagraph {
    pub text: String,
    pub style: Option<String>,
    pub bold: bool,
}

impl NewParagraph {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn styled(text: impl Into<String>, style: &str) -> Self {
        Self {
            text: text.into(),
            style: Some(style.to_string()),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            bold: true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResumeDocument {
    package: DocxPackage,
    xml: String,
    paragraphs: Vec<Paragraph>,
    insert_at: usize,
    styles: StyleCatalog,
}

impl ResumeDocument {
    /// Parses a .docx byte stream.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentFormatError> {
        let package = DocxPackage::read(bytes)?;

        let xml = package
            .part_text(DOCUMENT_PART)?
            .ok_or(DocumentFormatError::MissingPart(DOCUMENT_PART))?
            .to_string();
        let (paragraphs, insert_at) = parse_body(&xml)?;

        let styles = match package.part_text(STYLES_PART)? {
            Some(styles_xml) => StyleCatalog::parse(styles_xml)?,
            None => StyleCatalog::default(),
        };

        debug!(paragraphs = paragraphs.len(), "Parsed résumé document");
        Ok(Self {
            package,
            xml,
            paragraphs,
            insert_at,
            styles,
        })
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Index of the first paragraph satisfying `predicate`.
    pub fn find_paragraph<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&Paragraph) -> bool,
    {
        self.paragraphs.iter().position(predicate)
    }

    /// All paragraph texts joined by newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replaces a paragraph's visible text in place.
    ///
    /// Paragraph properties and position are kept; existing runs collapse into a
    /// single run carrying the first run's properties.
    pub fn replace_text(&mut self, index: usize, text: &str) {
        let Some(paragraph) = self.paragraphs.get_mut(index) else {
            return;
        };

        let text = xml_safe_text(text);
        let xml = paragraph_xml(
            &paragraph.open_tag,
            paragraph.properties_xml.as_deref(),
            paragraph.run_properties_xml.as_deref(),
            &text,
        );
        paragraph.text = text;
        match &mut paragraph.origin {
            Origin::Source { rewritten, .. } => *rewritten = Some(xml),
            Origin::Appended { xml: appended } => *appended = xml,
        }
    }

    pub fn append(&mut self, new: NewParagraph) {
        let text = xml_safe_text(&new.text);
        let style = new.style.as_deref().map(xml_safe_text);
        let properties_xml = style.as_deref().map(|style| {
            format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape(style))
        });
        let run_properties_xml = new.bold.then(|| "<w:rPr><w:b/></w:rPr>".to_string());
        let open_tag = "<w:p>".to_string();

        let xml = paragraph_xml(
            &open_tag,
            properties_xml.as_deref(),
            run_properties_xml.as_deref(),
            &text,
        );

        self.paragraphs.push(Paragraph {
            text,
            style,
            open_tag,
            properties_xml,
            run_properties_xml,
            origin: Origin::Appended { xml },
        });
    }

    /// Renders `document.xml` with all edits applied.
    pub fn render_xml(&self) -> String {
        let mut out = String::with_capacity(self.xml.len() + 1024);
        let mut cursor = 0;

        for paragraph in &self.paragraphs {
            if let Origin::Source {
                span,
                rewritten: Some(replacement),
            } = &paragraph.origin
            {
                out.push_str(&self.xml[cursor..span.start]);
                out.push_str(replacement);
                cursor = span.end;
            }
        }

        out.push_str(&self.xml[cursor..self.insert_at]);
        for paragraph in &self.paragraphs {
            if let Origin::Appended { xml } = &paragraph.origin {
                out.push_str(xml);
            }
        }
        out.push_str(&self.xml[self.insert_at..]);
        out
    }

    /// Serializes the document into a new .docx byte stream, consuming it.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, DocumentFormatError> {
        let xml = self.render_xml();
        self.package.set_part(DOCUMENT_PART, xml.into_bytes());
        self.package.write()
    }
}

/// Drops characters XML 1.0 cannot carry (C0 controls other than tab, newline and
/// carriage return, plus U+FFFE and U+FFFF). Escaping alone leaves them in place.
fn xml_safe_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .collect()
}

fn paragraph_xml(
    open_tag: &str,
    properties_xml: Option<&str>,
    run_properties_xml: Option<&str>,
    text: &str,
) -> String {
    let mut xml = String::from(open_tag);
    if let Some(properties) = properties_xml {
        xml.push_str(properties);
    }
    if !text.is_empty() {
        xml.push_str("<w:r>");
        if let Some(run_properties) = run_properties_xml {
            xml.push_str(run_properties);
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape(text));
        xml.push_str("</w:t></w:r>");
    }
    xml.push_str("</w:p>");
    xml
}

// ────────────────────────────────────────────────────────────────────────────
// Body parser
// ────────────────────────────────────────────────────────────────────────────

/// Collects one top-level paragraph while its events stream by.
struct ParagraphBuilder {
    start: usize,
    depth: usize,
    open_tag: Range<usize>,
    text: String,
    style: Option<String>,
    in_text: bool,
    properties_start: Option<usize>,
    properties: Option<Range<usize>>,
    runs_seen: usize,
    run_open: bool,
    run_properties_start: Option<usize>,
    run_properties: Option<Range<usize>>,
}

impl ParagraphBuilder {
    fn new(start: usize, depth: usize, open_tag: Range<usize>) -> Self {
        Self {
            start,
            depth,
            open_tag,
            text: String::new(),
            style: None,
            in_text: false,
            properties_start: None,
            properties: None,
            runs_seen: 0,
            run_open: false,
            run_properties_start: None,
            run_properties: None,
        }
    }

    fn in_properties(&self) -> bool {
        self.properties_start.is_some() && self.properties.is_none()
    }

    fn in_first_run(&self) -> bool {
        self.run_open && self.runs_seen == 1 && self.run_properties.is_none()
    }

    fn on_start(
        &mut self,
        e: &BytesStart,
        start: usize,
        depth: usize,
    ) -> Result<(), DocumentFormatError> {
        match e.name().as_ref() {
            b"w:pPr" if depth == self.depth + 1 => self.properties_start = Some(start),
            b"w:pStyle" if self.in_properties() => self.style = style_value(e)?,
            b"w:r" => {
                self.runs_seen += 1;
                self.run_open = true;
            }
            b"w:rPr" if self.in_first_run() => self.run_properties_start = Some(start),
            b"w:t" => self.in_text = true,
            _ => {}
        }
        Ok(())
    }

    fn on_empty(
        &mut self,
        e: &BytesStart,
        span: Range<usize>,
        depth: usize,
    ) -> Result<(), DocumentFormatError> {
        match e.name().as_ref() {
            b"w:pPr" if depth == self.depth + 1 => {
                self.properties_start = Some(span.start);
                self.properties = Some(span);
            }
            b"w:pStyle" if self.in_properties() => self.style = style_value(e)?,
            b"w:rPr" if self.in_first_run() => {
                self.run_properties_start = Some(span.start);
                self.run_properties = Some(span);
            }
            b"w:tab" if self.run_open => self.text.push('\t'),
            b"w:br" | b"w:cr" if self.run_open => self.text.push('\n'),
            _ => {}
        }
        Ok(())
    }

    fn on_end(&mut self, name: &[u8], end: usize, depth: usize) {
        match name {
            b"w:pPr" if depth == self.depth + 1 => {
                if let Some(start) = self.properties_start {
                    self.properties = Some(start..end);
                }
            }
            b"w:rPr" if self.run_open && self.run_properties.is_none() => {
                if let Some(start) = self.run_properties_start {
                    self.run_properties = Some(start..end);
                }
            }
            b"w:r" => self.run_open = false,
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }

    fn finish(self, xml: &str, end: usize) -> Paragraph {
        let open_tag = if xml[self.open_tag.clone()].ends_with("/>") {
            "<w:p>".to_string()
        } else {
            xml[self.open_tag].to_string()
        };
        Paragraph {
            text: self.text,
            style: self.style,
            open_tag,
            properties_xml: self.properties.map(|r| xml[r].to_string()),
            run_properties_xml: self.run_properties.map(|r| xml[r].to_string()),
            origin: Origin::Source {
                span: self.start..end,
                rewritten: None,
            },
        }
    }
}

fn style_value(e: &BytesStart) -> Result<Option<String>, DocumentFormatError> {
    let Some(attr) = e.try_get_attribute("w:val").map_err(body_error)? else {
        return Ok(None);
    };
    Ok(Some(attr.unescape_value().map_err(body_error)?.into_owned()))
}

fn body_error(e: impl std::fmt::Display) -> DocumentFormatError {
    DocumentFormatError::Xml {
        part: DOCUMENT_PART,
        message: e.to_string(),
    }
}

/// Start offset of the tag that ends at `end`. Markup never contains a raw `<`,
/// so the nearest one before `end` opens the tag.
fn tag_start(xml: &str, end: usize) -> usize {
    xml[..end].rfind('<').unwrap_or(0)
}

/// Returns the top-level body paragraphs and the offset where new paragraphs go.
fn parse_body(xml: &str) -> Result<(Vec<Paragraph>, usize), DocumentFormatError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    let mut section_start: Option<usize> = None;
    let mut insert_at: Option<usize> = None;
    let mut current: Option<ParagraphBuilder> = None;

    loop {
        let event = reader.read_event().map_err(body_error)?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                depth += 1;
                let start = tag_start(xml, end);
                let child_of_body = body_depth.is_some_and(|b| depth == b + 1);
                match e.name().as_ref() {
                    b"w:body" if body_depth.is_none() => body_depth = Some(depth),
                    b"w:p" if child_of_body && current.is_none() => {
                        section_start = None;
                        current = Some(ParagraphBuilder::new(start, depth, start..end));
                    }
                    b"w:sectPr" if child_of_body => section_start = Some(start),
                    _ => {
                        if let Some(builder) = current.as_mut() {
                            builder.on_start(&e, start, depth)?;
                        }
                    }
                }
            }
            Event::Empty(e) => {
                let start = tag_start(xml, end);
                let child_of_body = body_depth == Some(depth);
                match e.name().as_ref() {
                    b"w:p" if child_of_body && current.is_none() => {
                        section_start = None;
                        let builder = ParagraphBuilder::new(start, depth + 1, start..end);
                        paragraphs.push(builder.finish(xml, end));
                    }
                    b"w:sectPr" if child_of_body => section_start = Some(start),
                    _ => {
                        if let Some(builder) = current.as_mut() {
                            builder.on_empty(&e, start..end, depth + 1)?;
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some(builder) = current.as_mut().filter(|b| b.in_text) {
                    builder.text.push_str(&t.unescape().map_err(body_error)?);
                }
            }
            Event::CData(c) => {
                if let Some(builder) = current.as_mut().filter(|b| b.in_text) {
                    builder.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let name = e.name();
                let closes_paragraph = current.as_ref().is_some_and(|b| b.depth == depth);
                if name.as_ref() == b"w:p" && closes_paragraph {
                    if let Some(builder) = current.take() {
                        paragraphs.push(builder.finish(xml, end));
                    }
                } else if name.as_ref() == b"w:body" && body_depth == Some(depth) {
                    insert_at = Some(section_start.unwrap_or_else(|| tag_start(xml, end)));
                } else if let Some(builder) = current.as_mut() {
                    builder.on_end(name.as_ref(), end, depth);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match insert_at {
        Some(offset) => Ok((paragraphs, offset)),
        None => Err(DocumentFormatError::MissingBody),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
