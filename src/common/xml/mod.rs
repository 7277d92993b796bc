//! XML text helpers shared by the hand-written serializers.

mod escape;
mod namespace;

pub use escape::{decode_char_ref, escape_xml, unescape_xml};
pub use namespace::declare_on_root;
