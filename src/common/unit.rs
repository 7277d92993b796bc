//! Unit conversion utilities.
//!
//! WordprocessingML expresses page geometry in twentieths of a point ("twips"):
//! 20 twips per point and 72 points per inch, so 1440 twips per inch.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const TWIPS_PER_POINT: i64 = 20;
pub const POINTS_PER_INCH: i64 = 72;
pub const TWIPS_PER_INCH: i64 = TWIPS_PER_POINT * POINTS_PER_INCH;

/// A length in twips, the native unit of section properties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Twips(pub i64);

impl Twips {
    /// Convert to inches.
    #[inline]
    pub fn to_inches(self) -> f64 {
        self.0 as f64 / TWIPS_PER_INCH as f64
    }

    /// Parse a decimal attribute value such as `w:w="12240"`.
    ///
    /// Word occasionally writes fractional values; those are truncated.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        value
            .parse::<i64>()
            .ok()
            .or_else(|| value.parse::<f64>().ok().map(|v| v as i64))
            .map(Self)
    }
}

impl From<i64> for Twips {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Twips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}tw", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twips_per_inch() {
        assert_eq!(TWIPS_PER_INCH, 1440);
        assert_eq!(Twips(12240).to_inches(), 8.5);
        assert_eq!(Twips(720).to_inches(), 0.5);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Twips::parse("1440"), Some(Twips(1440)));
        assert_eq!(Twips::parse(" 720.6 "), Some(Twips(720)));
        assert_eq!(Twips::parse("-360"), Some(Twips(-360)));
        assert_eq!(Twips::parse("auto"), None);
    }
}
