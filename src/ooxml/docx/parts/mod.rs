/// Part implementations for Word documents.
///
/// Every editable part (body, headers, footers, footnotes) is a
/// [`DocumentPart`] tagged with its [`PartKind`].
pub mod document_part;

pub use document_part::{DocumentPart, PartKind};
