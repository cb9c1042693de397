use crate::ascii::{downscale_luminance, map_luminance, overlay};
use crate::config::AsciiConfig;
use crate::edges::{downscale_edges, map_edges};
use crate::error::{AsciiError, Result};
use crate::filters::{calculate_luminance, difference_of_gaussians};
use crate::grid::CharGrid;
use image::{GrayImage, RgbaImage};
use log::{debug, info};

/// Converts images to ASCII art under a fixed, validated configuration
///
/// The configuration is checked once in [`Converter::new`] and cannot change
/// afterwards, so `convert` is a pure function of its input image.
#[derive(Debug, Clone)]
pub struct Converter {
    config: AsciiConfig,
}

impl Converter {
    /// Validate `config` and build a converter around it
    pub fn new(config: AsciiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AsciiConfig {
        &self.config
    }

    /// Converts an image to ASCII art
    ///
    /// Pipeline:
    /// 1. Extract luminance from the color image
    /// 2. Base layer: box-downscale luminance and map it onto the charset
    /// 3. Edge layer: optional XDoG, Sobel classification, block voting
    /// 4. Overlay edges on the base layer (or return whichever layer is enabled)
    pub fn convert(&self, input: &RgbaImage) -> Result<CharGrid> {
        debug!("converting {}x{} image", input.width(), input.height());
        let lum = calculate_luminance(input);

        let base = if self.config.draw_fill {
            Some(self.base_layer(&lum)?)
        } else {
            None
        };

        let edges = if self.config.draw_edges {
            Some(self.edge_layer(&lum)?)
        } else {
            None
        };

        match (base, edges) {
            (Some(base), Some(edges)) if edges.is_blank() => {
                debug!("no edges survived, skipping overlay");
                Ok(base)
            }
            (Some(base), Some(edges)) => overlay(&base, &edges),
            (None, Some(edges)) => Ok(edges),
            (Some(base), None) => Ok(base),
            (None, None) => Err(AsciiError::config("no layer enabled")),
        }
    }

    fn base_layer(&self, lum: &GrayImage) -> Result<CharGrid> {
        info!("Mapping luminance to ascii...");
        let small = downscale_luminance(lum, self.config.width, self.config.squash)?;
        map_luminance(&small, &self.config.charset)
    }

    fn edge_layer(&self, lum: &GrayImage) -> Result<CharGrid> {
        info!("Mapping edges to ascii...");
        let edges = if self.config.apply_dog {
            let dog = difference_of_gaussians(lum, &self.config.dog)?;
            map_edges(&dog, self.config.sobel_threshold)?
        } else {
            map_edges(lum, self.config.sobel_threshold)?
        };
        downscale_edges(
            &edges,
            self.config.width,
            self.config.squash,
            self.config.edge_threshold,
        )
    }
}

/// Processes an input image and converts it to ASCII art
///
/// Shorthand for `Converter::new(config.clone())?.convert(input)`.
///
/// # Arguments
/// * `input` - The input RGBA image to convert
/// * `config` - Configuration parameters for the ASCII conversion
///
/// # Returns
/// The character grid, or the first error any stage raised
pub fn process_image(input: &RgbaImage, config: &AsciiConfig) -> Result<CharGrid> {
    Converter::new(config.clone())?.convert(input)
}
