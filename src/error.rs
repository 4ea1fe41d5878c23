//! Error types for the markdown-docx library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Packaging error: {0}")]
    Pack(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while walking the Markdown tree.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A node kind outside the supported mdast vocabulary.
    #[error("unreachable: unknown node kind")]
    UnknownNode,

    /// A node kind that may only appear under a specific parent.
    #[error("unreachable: `{0}` node outside of its parent")]
    UnexpectedNode(&'static str),

    /// No leading integer, id 0, or an id already taken by another identifier.
    #[error("Invalid footnote identifier: {0}")]
    InvalidFootnoteId(String),

    /// A footnote reference whose definition is missing.
    #[error("Footnote reference without definition: {0}")]
    UndefinedFootnote(String),
}

/// Errors that occur while resolving images.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("options.image_resolver is not defined")]
    MissingResolver,

    #[error("Fetch image was failed: {url}: {message}")]
    ImageFetch { url: String, message: String },

    #[error("Fetch image was failed: {0}")]
    ImageNotResolved(String),
}

/// Errors in caller supplied configuration or input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML options: {0}")]
    Toml(String),

    #[error("Invalid mdast JSON: {0}")]
    Json(String),
}
