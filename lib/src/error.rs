//! Error type shared by every pipeline stage

use thiserror::Error;

/// Failures raised while converting an image to ASCII art
///
/// Every stage validates its inputs eagerly and returns the first failure;
/// no stage produces partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AsciiError {
    /// Structural configuration problem (sizes, charset, layer switches)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A unit-interval parameter fell outside [0, 1]
    #[error("{name} must be between 0 and 1, inclusive (got {value})")]
    InvalidParameter { name: &'static str, value: f32 },

    /// Two grids that must line up cell for cell do not
    #[error("mismatched dimensions: {left_width}x{left_height} and {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    /// Block aggregation reached past the source grid
    #[error("{axis} out of range: {index} from {len}")]
    OutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    /// Source image has no pixels to sample
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, AsciiError>;

impl AsciiError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Checks that `value` lies in [0, 1], rejecting NaN as well
    pub(crate) fn check_unit(name: &'static str, value: f32) -> Result<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::InvalidParameter { name, value })
        }
    }
}
