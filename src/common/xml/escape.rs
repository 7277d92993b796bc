use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use std::borrow::Cow;

const SPECIAL: [&str; 5] = ["&", "<", ">", "\"", "'"];
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

static XML_ESCAPER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(SPECIAL).expect("static escape patterns are valid"));

// LeftmostLongest so that `&amp;lt;` decodes to `&lt;` and not `<`.
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(ENTITIES)
        .expect("static unescape patterns are valid")
});

/// Escape text for use in element content or a double-quoted attribute.
///
/// Part names, relationship targets and content types rarely need escaping,
/// so the input is borrowed back unless a special character is present.
///
/// # Examples
///
/// ```
/// use wordml::common::xml::escape_xml;
/// assert_eq!(escape_xml("R&D <draft>"), "R&amp;D &lt;draft&gt;");
/// assert!(matches!(escape_xml("/word/document.xml"), std::borrow::Cow::Borrowed(_)));
/// ```
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if XML_ESCAPER.is_match(s) {
        Cow::Owned(XML_ESCAPER.replace_all(s, &ENTITIES))
    } else {
        Cow::Borrowed(s)
    }
}

/// Decode the five predefined entities. Anything else is left untouched.
///
/// # Examples
///
/// ```
/// use wordml::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("Q&amp;A &lt;1&gt;"), "Q&A <1>");
/// assert_eq!(unescape_xml("&copy;"), "&copy;");
/// ```
pub fn unescape_xml(s: &str) -> Cow<'_, str> {
    if s.contains('&') {
        Cow::Owned(XML_UNESCAPER.replace_all(s, &SPECIAL))
    } else {
        Cow::Borrowed(s)
    }
}

/// Decode the body of a `&#NNN;` / `&#xHH;` character reference (`#NNN`, `#xHH`).
pub fn decode_char_ref(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
