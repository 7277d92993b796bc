//! wordml - open, edit and re-assemble Word (.docx) packages
//!
//! A package is unpacked into a working directory, its body, headers,
//! footers and footnotes are loaded as editable XML trees with a cursor each,
//! and saving writes every part back and packs a new container. Saving also
//! renumbers drawing identifiers across the package and makes the final
//! section's type explicit.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use wordml::{DocPropertiesUpdate, Document};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Start from the built-in template
//! let mut doc = Document::new()?;
//! doc.add_paragraph("Summary", Some("heading 1"))?;
//! doc.add_paragraph("All figures are preliminary.", None)?;
//! doc.add_page_break()?;
//!
//! doc.set_doc_properties(&DocPropertiesUpdate {
//!     title: Some("Quarterly report".to_string()),
//!     ..Default::default()
//! })?;
//!
//! // Demote every level-1 heading
//! let mapping = BTreeMap::from([("heading 2".to_string(), vec!["heading 1".to_string()])]);
//! doc.remap_styles(&mapping)?;
//!
//! let page = doc.page_geometry_at_cursor()?.to_inches();
//! println!("page: {} x {} in", page.width, page.height);
//!
//! doc.save("report.docx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.

/// Errors, units and XML text helpers shared by every layer.
pub mod common;

/// OOXML packaging, metadata and word-processing parts.
pub mod ooxml;

pub use common::{Error, Result, Twips};
pub use ooxml::docx;
pub use ooxml::docx::{
    Document, DocumentConfig, DocumentPart, Orientation, PageDimensions, PartKind,
    SectionGeometry, StyleCatalog, StyleRecord, StyleType,
};
pub use ooxml::metadata::{DocPropertiesUpdate, PropertyRecord};
