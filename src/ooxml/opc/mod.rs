//! Open Packaging Conventions (OPC) layer.
//!
//! The pieces of a package that are not word-processing parts themselves:
//!
//! - the physical store (unpack a container into a working directory, pack it back)
//! - the content-type registry (`[Content_Types].xml`)
//! - relationship collections (`.rels` parts)
//! - constants: media types, namespaces, relationship types and part locations

pub mod constants;
pub mod content_types;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypeRegistry;
pub use phys_pkg::PackageStore;
pub use rel::{Relationship, Relationships};
