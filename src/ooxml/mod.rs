//! Office Open XML (OOXML) support for word-processing packages.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): the container, content types and relationships
//! 2. **Metadata** (`metadata`): core properties (`docProps/core.xml`)
//! 3. **Word** (`docx`): editable parts, styles, sections and the save pipeline
pub mod docx;
pub mod metadata;
pub mod opc;

pub use metadata::{CoreProperties, DocPropertiesUpdate, PropertyRecord};
pub use opc::{ContentTypeRegistry, PackageStore, Relationship, Relationships};
