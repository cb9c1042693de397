use crate::error::{AsciiError, Result};
use crate::grid::{BlockScale, CharGrid};
use crate::lut::{BLANK, fill_char};
use image::{GrayImage, imageops};
use log::{debug, info};
use rayon::prelude::*;

/// Downscale luminance to one pixel per output character
///
/// Uses area-average (box) resampling to `width` × `floor(H / (W / width * aspect_weight))`.
///
/// # Arguments
/// * `lum` - Input luminance image
/// * `width` - Target width in characters
/// * `aspect_weight` - Vertical squash for character cells
///
/// # Returns
/// Grayscale image with one pixel per character cell
pub fn downscale_luminance(lum: &GrayImage, width: u32, aspect_weight: f32) -> Result<GrayImage> {
    let (src_width, src_height) = lum.dimensions();
    let scale = BlockScale::new(src_width, src_height, width, aspect_weight)?;
    debug!(
        "luminance {}x{} -> {}x{}",
        src_width, src_height, scale.width, scale.height
    );

    if scale.height == 0 {
        return Ok(GrayImage::new(scale.width, 0));
    }
    Ok(imageops::thumbnail(lum, scale.width, scale.height))
}

/// Map each luminance pixel to a glyph from `charset`
///
/// # Errors
/// `Config` if `charset` is empty
pub fn map_luminance(lum: &GrayImage, charset: &[char]) -> Result<CharGrid> {
    if charset.is_empty() {
        return Err(AsciiError::config("charset must not be empty"));
    }

    let (width, height) = lum.dimensions();
    let mut cells = vec![BLANK; width as usize * height as usize];
    if width > 0 {
        cells
            .par_chunks_mut(width as usize)
            .zip(lum.par_chunks(width as usize))
            .for_each(|(out_row, lum_row)| {
                for (out, &value) in out_row.iter_mut().zip(lum_row) {
                    *out = fill_char(value, charset);
                }
            });
    }

    Ok(CharGrid::from_cells(width as usize, height as usize, cells))
}

/// Lay the edge layer over the base layer
///
/// Edge glyphs win wherever they are not blank.
///
/// # Errors
/// `DimensionMismatch` if the grids differ in size
pub fn overlay(base: &CharGrid, edges: &CharGrid) -> Result<CharGrid> {
    if base.dimensions() != edges.dimensions() {
        return Err(AsciiError::DimensionMismatch {
            left_width: base.width(),
            left_height: base.height(),
            right_width: edges.width(),
            right_height: edges.height(),
        });
    }

    info!("Overlaying edges...");
    let cells = base
        .cells()
        .iter()
        .zip(edges.cells())
        .map(|(&b, &e)| if e == BLANK { b } else { e })
        .collect();

    Ok(CharGrid::from_cells(base.width(), base.height(), cells))
}
