use crate::error::{AsciiError, Result};
use crate::lut::DEFAULT_CHARSET;

/// Parameters for the XDoG preprocessing pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DogParams {
    pub sigma1: f32,  // std-dev of the first blur, default 4.0
    pub sigma2: f32,  // std-dev of the second blur, default 10.0
    pub epsilon: f32, // level at which the difference counts as fully bright, 0-1, default 0.65
    pub tau: f32,     // weight of the larger-scale blur, default 0.8
    pub phi: f32,     // sharpness of the tanh falloff, default 25.0
}

impl Default for DogParams {
    fn default() -> Self {
        Self {
            sigma1: 4.0,
            sigma2: 10.0,
            epsilon: 0.65,
            tau: 0.8,
            phi: 25.0,
        }
    }
}

/// Configuration for ASCII art conversion
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiConfig {
    /// Glyphs ordered sparsest to densest
    pub charset: Vec<char>,

    /// Output size
    pub width: u32,  // characters per row, default 175
    pub squash: f32, // vertical compression for tall character cells, default 2.3

    /// Edge detection
    pub dog: DogParams,
    pub sobel_threshold: f32, // fraction of max gradient, 0-1, default 0.15
    pub edge_threshold: f32,  // edge density required per block, 0-1, default 0.05

    /// Layers
    pub draw_fill: bool,  // luminance-mapped base layer, default true
    pub draw_edges: bool, // edge-direction layer, default true
    pub apply_dog: bool,  // XDoG before Sobel, default true
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_vec(),

            width: 175,
            squash: 2.3,

            dog: DogParams::default(),
            sobel_threshold: 0.15,
            edge_threshold: 0.05,

            draw_fill: true,
            draw_edges: true,
            apply_dog: true,
        }
    }
}

impl AsciiConfig {
    /// Replaces the charset with the characters of `glyphs`
    pub fn with_charset(mut self, glyphs: &str) -> Self {
        self.charset = glyphs.chars().collect();
        self
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.draw_fill && !self.draw_edges {
            return Err(AsciiError::config(
                "both edge detection and base ASCII generation are disabled; enable at least one",
            ));
        }
        if self.width == 0 {
            return Err(AsciiError::config("width must be positive"));
        }
        if !(self.squash.is_finite() && self.squash > 0.0) {
            return Err(AsciiError::config(format!(
                "squash must be positive, got {}",
                self.squash
            )));
        }
        if self.draw_fill && self.charset.is_empty() {
            return Err(AsciiError::config("charset must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.edge_threshold) {
            return Err(AsciiError::config(format!(
                "edge threshold must be between 0 and 1, got {}",
                self.edge_threshold
            )));
        }
        AsciiError::check_unit("epsilon", self.dog.epsilon)?;
        AsciiError::check_unit("sobel threshold", self.sobel_threshold)?;
        Ok(())
    }
}
