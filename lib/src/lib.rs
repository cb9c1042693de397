//! Edge ASCII - image to ASCII art converter
//!
//! Renders an image as monospace text by combining two glyph layers: a base
//! layer that maps block luminance onto a charset, and an edge layer that
//! draws `_ | / \` where Sobel gradients (optionally after XDoG
//! preprocessing) agree on a direction.
//!
//! # Example
//! ```no_run
//! use edge_ascii::{process_image, AsciiConfig};
//! use image;
//!
//! let input = image::open("photo.jpg").unwrap().to_rgba8();
//! let config = AsciiConfig::default();
//! let art = process_image(&input, &config).unwrap();
//! println!("{art}");
//! ```

pub mod ascii;
pub mod config;
pub mod edges;
pub mod error;
pub mod filters;
pub mod grid;
pub mod lut;
pub mod processor;

// Re-export main types for convenience
pub use config::{AsciiConfig, DogParams};
pub use edges::{EdgeClass, EdgeMap};
pub use error::{AsciiError, Result};
pub use grid::CharGrid;
pub use processor::{Converter, process_image};
