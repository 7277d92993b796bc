/// Word (.docx) document support.
///
/// A [`Document`] is opened from a container (or the built-in template), its
/// parts are edited in memory through cursors, and [`Document::save`] runs
/// the assembly sequence that writes a new container.
///
/// # Architecture
///
/// - `DocumentPart`: one editable XML part (body, header, footer, footnotes)
///   with its cursor
/// - `StyleCatalog`: style records parsed from `word/styles.xml`
/// - `SectionGeometry`: page size and margins of a section
/// - `AssemblyPipeline`: identifier renumbering, section normalization,
///   persistence and packing
/// - `Document`: the public API tying them together
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use wordml::docx::Document;
///
/// let mut doc = Document::open(Some(Path::new("input.docx")))?;
/// doc.cursor_begin()?;
/// doc.add_paragraph("Inserted after the first block", None)?;
///
/// for name in doc.bookmark_names()? {
///     println!("bookmark: {}", name);
/// }
/// doc.save("output.docx")?;
/// # Ok::<(), wordml::Error>(())
/// ```
pub mod assembly;
pub mod bookmark;
pub mod config;
pub mod document;
pub mod enums;
pub mod paragraph;
pub mod parts;
pub mod query;
pub mod section;
pub mod styles;
pub mod template;

pub use assembly::{AssemblyPipeline, IdCounter};
pub use config::DocumentConfig;
pub use document::Document;
pub use enums::{Orientation, StyleType};
pub use parts::{DocumentPart, PartKind};
pub use section::{Margins, PageDimensions, SectionGeometry};
pub use styles::{StyleCatalog, StyleRecord};
