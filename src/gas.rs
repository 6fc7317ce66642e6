//! Breathing gas mixes and the user-facing gas/pO₂ string parsers.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::O2_IN_AIR;

/// A breathing gas mix. Fractions are stored in permille; the balance is
/// nitrogen. `o2 + he <= 1000`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasMix {
    pub o2: i32,
    pub he: i32,
}

impl GasMix {
    pub const AIR: GasMix = GasMix { o2: O2_IN_AIR, he: 0 };

    pub fn new(o2: i32, he: i32) -> Self {
        GasMix { o2, he }
    }

    /// Component-wise distance in permille. Two mixes closer than 200 are
    /// treated as the same gas when matching cylinders.
    pub fn distance(&self, other: &GasMix) -> i32 {
        (self.o2 - other.o2).abs() + (self.he - other.he).abs()
    }

    /// The null mix marks "keep breathing whatever is current".
    pub fn is_null(&self) -> bool {
        self.o2 == 0 && self.he == 0
    }

    pub fn is_air(&self) -> bool {
        self.he == 0 && (self.o2 == 0 || (O2_IN_AIR - 1..=O2_IN_AIR + 1).contains(&self.o2))
    }

    /// Nitrogen fraction, permille.
    pub fn n2(&self) -> i32 {
        1000 - self.o2 - self.he
    }
}

impl fmt::Display for GasMix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_air() {
            write!(f, "air")
        } else if self.he == 0 {
            write!(f, "EAN{}", (self.o2 + 5) / 10)
        } else {
            write!(f, "{}/{}", (self.o2 + 5) / 10, (self.he + 5) / 10)
        }
    }
}

/// Parse a decimal number into tenths ("10.2" == 102, "9" == 90). Only the
/// first fractional digit is significant; the rest are consumed. Returns the
/// value and the unparsed remainder.
fn get_tenths(text: &str) -> Option<(i32, &str)> {
    let s = text.trim_start();
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let mut value: i32 = s[..digits].parse().ok()?;
    value = value.checked_mul(10)?;
    let mut rest = &s[digits..];
    if let Some(frac) = rest.strip_prefix('.') {
        let first = frac.chars().next()?;
        if !first.is_ascii_digit() {
            return None;
        }
        value += first as i32 - '0' as i32;
        rest = frac.trim_start_matches(|c: char| c.is_ascii_digit());
    }
    Some((value, rest))
}

/// Tenths of a percent are permille; a trailing '%' is allowed.
fn get_permille(text: &str) -> Option<(i32, &str)> {
    let (value, rest) = get_tenths(text)?;
    Some((value, rest.strip_prefix('%').unwrap_or(rest)))
}

/// Parse a user gas string: "air", "EAN32", "21/35", with tenths-of-a-percent
/// precision and an optional '%' after each number. Returns `None` on any
/// malformed or out-of-range input so the caller keeps its previous value.
pub fn validate_gas(text: &str) -> Option<GasMix> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }

    let (o2, he, rest) = if text.eq_ignore_ascii_case("air") {
        (O2_IN_AIR, 0, "")
    } else if text.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("ean")) {
        let (o2, rest) = get_permille(&text[3..])?;
        (o2, 0, rest)
    } else {
        let (o2, mut rest) = get_permille(text)?;
        let mut he = 0;
        if let Some(after) = rest.strip_prefix('/') {
            let (value, r) = get_permille(after)?;
            he = value;
            rest = r;
        }
        (o2, he, rest)
    };

    // no extra crud after the mix
    if !rest.trim_start().is_empty() {
        return None;
    }

    if !(1..=1000).contains(&o2) || he < 0 || o2 + he > 1000 {
        return None;
    }
    Some(GasMix { o2, he })
}

/// Parse a pO₂ string in tenths of a bar into mbar ("1.4" == 1400).
pub fn validate_po2(text: &str) -> Option<i32> {
    let (tenths, rest) = get_tenths(text)?;
    if !rest.trim_start().is_empty() {
        return None;
    }
    Some(tenths * 100)
}
