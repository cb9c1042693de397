//! ASCII character lookup tables
//!
//! Edge glyphs are fixed per direction; fill glyphs come from a caller-supplied
//! charset ordered from sparsest to densest.

use crate::edges::EdgeClass;

/// Glyph emitted where neither layer has anything to draw
pub const BLANK: char = ' ';

/// Edge glyphs in tie-break precedence order:
/// Horizontal, Vertical, DiagonalUp, DiagonalDown
pub const EDGE_CHARS: [char; 4] = ['_', '|', '/', '\\'];

/// Default fill ramp, 10 levels from darkest (space) to brightest (@)
pub const DEFAULT_CHARSET: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Get the glyph for an edge class
///
/// `None` and `Undetermined` have no direction and render blank.
pub fn edge_char(class: EdgeClass) -> char {
    match class {
        EdgeClass::Horizontal => EDGE_CHARS[0],
        EdgeClass::Vertical => EDGE_CHARS[1],
        EdgeClass::DiagonalUp => EDGE_CHARS[2],
        EdgeClass::DiagonalDown => EDGE_CHARS[3],
        EdgeClass::None | EdgeClass::Undetermined => BLANK,
    }
}

/// Get the fill glyph for an 8-bit luminance
///
/// The index is `luminance * (N - 1) / 255` in integer arithmetic, so 0 maps to
/// the first glyph and 255 to the last. `charset` must be non-empty; callers
/// check this once before mapping a whole grid.
pub fn fill_char(luminance: u8, charset: &[char]) -> char {
    let index = luminance as usize * (charset.len() - 1) / 255;
    charset[index]
}
