//! Character grids and block geometry shared by the luminance and edge layers

use crate::error::{AsciiError, Result};
use crate::lut::BLANK;
use std::fmt;

/// A row-major grid of glyphs
///
/// Displays as rows joined by `\n`, without a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl CharGrid {
    /// Create a grid filled with a single glyph
    pub fn filled(width: usize, height: usize, glyph: char) -> Self {
        Self {
            width,
            height,
            cells: vec![glyph; width * height],
        }
    }

    /// Build a grid from rows, which must all have the same length
    pub fn from_rows(rows: Vec<Vec<char>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != width) {
            return Err(AsciiError::DimensionMismatch {
                left_width: width,
                left_height: height,
                right_width: bad.len(),
                right_height: height,
            });
        }
        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a grid from a flat row-major cell vector
    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<char>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Glyph at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    /// Iterate over rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        // chunks() panics on 0, and a zero-width grid has no cells anyway
        self.cells.chunks(self.width.max(1))
    }

    /// True when every cell is the blank glyph
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| c == BLANK)
    }
}

impl fmt::Display for CharGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for &c in row {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Mapping from a source pixel grid onto a character grid
///
/// Each output cell covers `x_scale` source columns and `y_scale` source rows,
/// where `y_scale = x_scale * aspect_weight` compensates for character cells
/// being taller than they are wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockScale {
    pub x_scale: f64,
    pub y_scale: f64,
    pub width: u32,
    pub height: u32,
}

impl BlockScale {
    pub fn new(src_width: u32, src_height: u32, width: u32, aspect_weight: f32) -> Result<Self> {
        if width == 0 {
            return Err(AsciiError::config("non-positive width: 0"));
        }
        if !(aspect_weight.is_finite() && aspect_weight > 0.0) {
            return Err(AsciiError::config(format!(
                "non-positive aspect weight: {aspect_weight:.2}"
            )));
        }
        if src_width == 0 || src_height == 0 {
            return Err(AsciiError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        let x_scale = src_width as f64 / width as f64;
        let y_scale = x_scale * aspect_weight as f64;
        let height = (src_height as f64 / y_scale).floor() as u32;

        Ok(Self {
            x_scale,
            y_scale,
            width,
            height,
        })
    }
}
