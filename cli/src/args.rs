//! CLI argument parsing with clap.

use clap::Parser;
use edge_ascii::{AsciiConfig, DogParams};
use std::path::PathBuf;

/// Parse a value in [0, 1]
fn parse_unit(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("must be between 0 and 1, got {}", value));
    }
    Ok(value)
}

/// Parse a strictly positive value
fn parse_positive(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(value.is_finite() && value > 0.0) {
        return Err(format!("must be positive, got {}", value));
    }
    Ok(value)
}

/// Render an image as ASCII art with luminance fill and edge glyphs
#[derive(Parser, Debug)]
#[command(name = "edge-ascii")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Image to convert (any format the image crate decodes)
    pub image: PathBuf,

    /// ASCII characters to map luminance onto, sparsest first
    #[arg(long, default_value = " .:-=+*#%@")]
    pub charset: String,

    /// Output width in characters
    #[arg(short, long, default_value_t = 175, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Sigma for the first Gaussian blur
    #[arg(long, default_value_t = 4.0)]
    pub sigma1: f32,

    /// Sigma for the second Gaussian blur
    #[arg(long, default_value_t = 10.0)]
    pub sigma2: f32,

    /// Level at which the DoG response counts as fully bright
    #[arg(long, default_value_t = 0.65, value_parser = parse_unit)]
    pub epsilon: f32,

    /// Weight of the larger-scale blur in the DoG
    #[arg(long, default_value_t = 0.8)]
    pub tau: f32,

    /// Sharpness of the DoG soft threshold
    #[arg(long, default_value_t = 25.0)]
    pub phi: f32,

    /// Minimum gradient strength (fraction of max) for the Sobel filter
    #[arg(long, default_value_t = 0.15, value_parser = parse_unit)]
    pub sobel_threshold: f32,

    /// Minimum edge density in a downscaled block
    #[arg(long, default_value_t = 0.05, value_parser = parse_unit)]
    pub edge_threshold: f32,

    /// Vertical compression offsetting the character cell aspect ratio
    #[arg(long, default_value_t = 2.3, value_parser = parse_positive)]
    pub squash: f32,

    /// Convert without edge detection
    #[arg(long)]
    pub no_edges: bool,

    /// Convert without the luminance base layer
    #[arg(long)]
    pub no_base: bool,

    /// Skip Difference of Gaussians preprocessing before edge detection
    #[arg(long)]
    pub no_dog: bool,

    /// Write the art to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Build the converter configuration from the parsed flags
    pub fn to_config(&self) -> AsciiConfig {
        AsciiConfig {
            width: self.width,
            squash: self.squash,
            dog: DogParams {
                sigma1: self.sigma1,
                sigma2: self.sigma2,
                epsilon: self.epsilon,
                tau: self.tau,
                phi: self.phi,
            },
            sobel_threshold: self.sobel_threshold,
            edge_threshold: self.edge_threshold,
            draw_fill: !self.no_base,
            draw_edges: !self.no_edges,
            apply_dog: !self.no_dog,
            ..AsciiConfig::default().with_charset(&self.charset)
        }
    }
}
