// Résumé document handling: read a .docx package, expose its body paragraphs,
// patch the skills block / append a suggestions section, write a new package.
// Parsing and writing are CPU-bound; handlers run them inside spawn_blocking.

pub mod handlers;
pub mod model;
pub mod package;
pub mod patcher;
pub mod styles;

use thiserror::Error;

pub use model::ResumeDocument;
pub use patcher::patch_document;

/// Conventional download name for a patched résumé.
pub const UPDATED_FILENAME: &str = "resume_updated.docx";

/// MIME type of WordprocessingML documents.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The supplied bytes are not a usable word-processing document.
#[derive(Debug, Error)]
pub enum DocumentFormatError {
    #[error("not a valid .docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("document package is missing required part '{0}'")]
    MissingPart(&'static str),

    #[error("part '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("malformed XML in '{part}': {message}")]
    Xml { part: &'static str, message: String },

    #[error("document has no <w:body> element")]
    MissingBody,

    #[error("part '{part}' exceeds size limit: {size} bytes (max: {limit} bytes)")]
    TooLarge { part: String, size: u64, limit: u64 },

    #[error("I/O error while processing document: {0}")]
    Io(#[from] std::io::Error),
}
