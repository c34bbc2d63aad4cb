//! Palmer-style display notation.

use super::{Jaw, Side, ToothNumber, ToothSet};

/// Digit for permanent teeth, letter A–E for deciduous teeth.
pub fn tooth_glyph(tooth: ToothNumber) -> char {
    let position = tooth.position();
    if tooth.is_deciduous() {
        (b'A' + position - 1) as char
    } else {
        (b'0' + position) as char
    }
}

/// Quadrant-aware two-glyph notation, e.g. `6⏌` for 16 and `⎾6` for 36.
pub fn to_display_notation(tooth: ToothNumber) -> String {
    let glyph = tooth_glyph(tooth);
    match (tooth.jaw(), tooth.side()) {
        (Jaw::Upper, Side::Right) => format!("{}⏌", glyph),
        (Jaw::Upper, Side::Left) => format!("⎿{}", glyph),
        (Jaw::Lower, Side::Left) => format!("⎾{}", glyph),
        (Jaw::Lower, Side::Right) => format!("{}⏋", glyph),
    }
}

/// Concatenated display notation for a tooth-set, e.g. `⎾6⎾7`.
pub fn set_display_notation(teeth: &ToothSet) -> String {
    teeth.iter().map(to_display_notation).collect()
}
