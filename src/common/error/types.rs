//! The crate-wide error enum.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wordml operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error, propagated as-is
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Archive codec error, propagated as-is
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// An explicit source path given to `open` does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A save target whose name does not carry the container suffix
    #[error("Invalid target extension: '{target}' does not end with '.{expected}'")]
    InvalidTargetExtension { target: String, expected: String },

    /// Style names absent from the catalog (the complete set, sorted)
    #[error("Unknown style name(s): {}", .0.join(", "))]
    UnknownStyleName(Vec<String>),

    /// A part's cursor resolved to no node
    #[error("Cursor does not resolve to a node: {0}")]
    CursorUnresolved(String),

    /// A part file is missing from the working directory
    #[error("Part not found: {}", .0.display())]
    PartNotFound(PathBuf),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Path expression compilation or evaluation error
    #[error("XPath error: {0}")]
    XPath(String),

    /// Structurally invalid content or request
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// No body element matches the cursor search pattern
    #[error("No content matches keyword: {0}")]
    KeywordNotFound(String),

    /// No bookmark with the requested name
    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),

    /// A property owned by the save pipeline cannot be set by callers
    #[error("Property '{0}' is managed when saving and cannot be set")]
    ReservedProperty(String),

    /// Invalid search pattern
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Result type for wordml operations.
pub type Result<T> = std::result::Result<T, Error>;
