use crate::error::{AsciiError, Result};
use crate::grid::{BlockScale, CharGrid};
use crate::lut::edge_char;
use image::GrayImage;
use log::{debug, info};
use rayon::prelude::*;
use std::f64::consts::{PI, TAU};

/// Largest single-axis Sobel response on 8-bit input (255 * 4)
const MAX_AXIS_RESPONSE: f64 = 1020.0;

/// Per-pixel edge classification
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeClass {
    /// Border pixel the 3×3 kernel never visited
    #[default]
    Undetermined,
    /// Gradient magnitude below threshold
    None,
    Horizontal,   // _
    Vertical,     // |
    DiagonalUp,   // /
    DiagonalDown, // \
}

impl EdgeClass {
    /// Directed classes in tie-break precedence order
    pub const DIRECTIONS: [EdgeClass; 4] = [
        EdgeClass::Horizontal,
        EdgeClass::Vertical,
        EdgeClass::DiagonalUp,
        EdgeClass::DiagonalDown,
    ];
}

/// Classify the orientation of the vector `(x, y)`
///
/// Angles are folded into [0, π) so opposite vectors share a class. Sectors are
/// π/4 wide and centred on 0, π/4, π/2 and 3π/4:
/// Horizontal, DiagonalUp, Vertical, DiagonalDown.
///
/// Returns `None` when the magnitude is zero or below `threshold`.
pub fn classify_orientation(x: f64, y: f64, threshold: f64) -> EdgeClass {
    let magnitude = y.hypot(x);
    if magnitude < threshold || magnitude == 0.0 {
        return EdgeClass::None;
    }

    // atan2 yields (-π, π]
    let mut angle = y.atan2(x) % TAU;
    if angle < 0.0 {
        angle += PI;
    }

    match angle {
        a if a < PI / 8.0 => EdgeClass::Horizontal,
        a if a < 3.0 * PI / 8.0 => EdgeClass::DiagonalUp,
        a if a < 5.0 * PI / 8.0 => EdgeClass::Vertical,
        a if a < 7.0 * PI / 8.0 => EdgeClass::DiagonalDown,
        // [7π/8, π] wraps back around to horizontal
        _ => EdgeClass::Horizontal,
    }
}

/// Sobel responses at one pixel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GradientSample {
    pub sum_x: i32,
    pub sum_y: i32,
}

impl GradientSample {
    // Gx (horizontal):     Gy (vertical):
    // [-1  0  1]           [-1 -2 -1]
    // [-2  0  2]           [ 0  0  0]
    // [-1  0  1]           [ 1  2  1]
    const KERNEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
    const KERNEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

    /// Convolve the 3×3 neighbourhood centred on `(x, y)`
    ///
    /// Returns `None` for border pixels, where the kernel would leave the image.
    pub fn at(img: &GrayImage, x: u32, y: u32) -> Option<Self> {
        let (width, height) = img.dimensions();
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            return None;
        }

        let mut sum_x = 0;
        let mut sum_y = 0;
        for ky in 0..3 {
            for kx in 0..3 {
                let pixel = img.get_pixel(x + kx - 1, y + ky - 1)[0] as i32;
                sum_x += pixel * Self::KERNEL_X[ky as usize][kx as usize];
                sum_y += pixel * Self::KERNEL_Y[ky as usize][kx as usize];
            }
        }
        Some(Self { sum_x, sum_y })
    }

    /// Classify the edge running through this pixel
    ///
    /// A strong horizontal change is a vertical edge, so the sums are swapped
    /// before classifying: `(sum_y, sum_x)` points along the edge line.
    pub fn classify(self, threshold: f64) -> EdgeClass {
        classify_orientation(self.sum_y as f64, self.sum_x as f64, threshold)
    }
}

/// Per-pixel edge classes for a whole image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    cells: Vec<EdgeClass>,
}

impl EdgeMap {
    /// Build a map from row-major cells
    ///
    /// # Errors
    /// `DimensionMismatch` if `cells.len() != width * height`
    pub fn from_cells(width: usize, height: usize, cells: Vec<EdgeClass>) -> Result<Self> {
        if cells.len() != width * height {
            return Err(AsciiError::DimensionMismatch {
                left_width: width,
                left_height: height,
                right_width: cells.len(),
                right_height: 1,
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Class at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<EdgeClass> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn cells(&self) -> &[EdgeClass] {
        &self.cells
    }
}

/// Apply the Sobel operator and classify every interior pixel
///
/// `sobel_threshold` is a fraction of the largest possible gradient magnitude.
/// Border pixels stay `Undetermined`.
///
/// # Errors
/// `InvalidParameter` if `sobel_threshold` is outside [0, 1]
pub fn map_edges(img: &GrayImage, sobel_threshold: f32) -> Result<EdgeMap> {
    AsciiError::check_unit("sobel threshold", sobel_threshold)?;

    info!("Mapping edges...");
    let threshold = sobel_threshold as f64 * MAX_AXIS_RESPONSE.hypot(MAX_AXIS_RESPONSE);
    let (width, height) = img.dimensions();
    let mut cells = vec![EdgeClass::Undetermined; width as usize * height as usize];

    if width > 2 && height > 2 {
        cells
            .par_chunks_mut(width as usize)
            .enumerate()
            .skip(1)
            .take(height as usize - 2)
            .for_each(|(y, row)| {
                for x in 1..width - 1 {
                    if let Some(sample) = GradientSample::at(img, x, y as u32) {
                        row[x as usize] = sample.classify(threshold);
                    }
                }
            });
    }

    EdgeMap::from_cells(width as usize, height as usize, cells)
}

/// Class counts over one block of an `EdgeMap`
#[derive(Clone, Copy, Debug, Default)]
struct EdgeTally {
    counts: [u32; 6],
}

impl EdgeTally {
    fn add(&mut self, class: EdgeClass) {
        self.counts[class as usize] += 1;
    }

    fn count(&self, class: EdgeClass) -> u32 {
        self.counts[class as usize]
    }

    /// Cells that received a classification, including `None`
    fn classified(&self) -> u32 {
        self.counts.iter().sum::<u32>() - self.count(EdgeClass::Undetermined)
    }

    /// Most frequent direction; ties go to the earlier entry of `DIRECTIONS`
    fn dominant(&self) -> Option<(EdgeClass, u32)> {
        let mut best: Option<(EdgeClass, u32)> = None;
        for class in EdgeClass::DIRECTIONS {
            let count = self.count(class);
            if count > 0 && best.is_none_or(|(_, max)| count > max) {
                best = Some((class, count));
            }
        }
        best
    }

    /// The winning direction if its share of classified cells exceeds `density`
    fn resolve(&self, density: f32) -> EdgeClass {
        let total = self.classified();
        match self.dominant() {
            Some((class, max)) if total > 0 && max as f64 / total as f64 > density as f64 => {
                class
            }
            _ => EdgeClass::None,
        }
    }
}

/// Downscale an `EdgeMap` into a grid of edge glyphs
///
/// Each output cell votes over a block of `x_scale` × `y_scale` source pixels
/// (see [`BlockScale`]). The winning direction is drawn only when it makes up
/// more than `density_threshold` of the block's classified pixels; otherwise
/// the cell is blank.
///
/// # Errors
/// * `Config` for a zero width, non-positive aspect weight or a density
///   threshold outside [0, 1]
/// * `OutOfRange` if a block reaches past the source grid
pub fn downscale_edges(
    edges: &EdgeMap,
    width: u32,
    aspect_weight: f32,
    density_threshold: f32,
) -> Result<CharGrid> {
    if !(0.0..=1.0).contains(&density_threshold) {
        return Err(AsciiError::config(format!(
            "threshold needs to be between 0 and 1: {density_threshold:.2}"
        )));
    }
    let scale = BlockScale::new(
        edges.width as u32,
        edges.height as u32,
        width,
        aspect_weight,
    )?;

    info!("Downscaling edges...");
    debug!(
        "edge blocks {}x{} from {}x{}",
        scale.width, scale.height, edges.width, edges.height
    );

    let out_width = scale.width as usize;
    let rows = (0..scale.height as usize)
        .into_par_iter()
        .map(|y| {
            (0..out_width)
                .map(|x| {
                    let tally = tally_block(edges, &scale, x, y)?;
                    Ok(edge_char(tally.resolve(density_threshold)))
                })
                .collect::<Result<Vec<char>>>()
        })
        .collect::<Result<Vec<Vec<char>>>>()?;

    let cells = rows.into_iter().flatten().collect();
    Ok(CharGrid::from_cells(out_width, scale.height as usize, cells))
}

fn tally_block(edges: &EdgeMap, scale: &BlockScale, x: usize, y: usize) -> Result<EdgeTally> {
    let top = (y as f64 * scale.y_scale).floor() as usize;
    let left = (x as f64 * scale.x_scale).floor() as usize;

    let mut tally = EdgeTally::default();
    let mut dy = 0;
    while (dy as f64) < scale.y_scale {
        let row = top + dy;
        if row >= edges.height {
            return Err(AsciiError::OutOfRange {
                axis: "y",
                index: row,
                len: edges.height,
            });
        }
        let mut dx = 0;
        while (dx as f64) < scale.x_scale {
            let col = left + dx;
            if col >= edges.width {
                return Err(AsciiError::OutOfRange {
                    axis: "x",
                    index: col,
                    len: edges.width,
                });
            }
            tally.add(edges.cells[row * edges.width + col]);
            dx += 1;
        }
        dy += 1;
    }
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn map(width: usize, height: usize, cells: Vec<EdgeClass>) -> EdgeMap {
        EdgeMap::from_cells(width, height, cells).unwrap()
    }

    #[test]
    fn test_classify_zero_and_weak() {
        assert_eq!(classify_orientation(0.0, 0.0, 0.0), EdgeClass::None);
        assert_eq!(classify_orientation(2.0, 2.0, 8.0), EdgeClass::None);
    }

    #[test]
    fn test_classify_horizontal() {
        assert_eq!(classify_orientation(2.0, 0.0, 1.0), EdgeClass::Horizontal);
        assert_eq!(classify_orientation(-2.0, 0.0, 1.0), EdgeClass::Horizontal);
    }

    #[test]
    fn test_classify_vertical() {
        assert_eq!(classify_orientation(0.0, 2.0, 1.0), EdgeClass::Vertical);
        assert_eq!(classify_orientation(0.0, -2.0, 1.0), EdgeClass::Vertical);
    }

    #[test]
    fn test_classify_diagonal() {
        assert_eq!(classify_orientation(2.0, 2.0, 1.0), EdgeClass::DiagonalUp);
        assert_eq!(classify_orientation(-2.0, -2.0, 1.0), EdgeClass::DiagonalUp);
        assert_eq!(classify_orientation(2.0, -2.0, 1.0), EdgeClass::DiagonalDown);
        assert_eq!(classify_orientation(-2.0, 2.0, 1.0), EdgeClass::DiagonalDown);
    }

    #[test]
    fn test_classify_sector_boundaries() {
        let at = |angle: f64| classify_orientation(angle.cos(), angle.sin(), 0.0);
        assert_eq!(at(PI / 8.0 - 1e-6), EdgeClass::Horizontal);
        assert_eq!(at(PI / 8.0 + 1e-6), EdgeClass::DiagonalUp);
        assert_eq!(at(3.0 * PI / 8.0 + 1e-6), EdgeClass::Vertical);
        assert_eq!(at(5.0 * PI / 8.0 + 1e-6), EdgeClass::DiagonalDown);
        assert_eq!(at(7.0 * PI / 8.0 + 1e-6), EdgeClass::Horizontal);
    }

    #[test]
    fn test_classify_is_pi_periodic() {
        for step in 0..32 {
            let angle = step as f64 * PI / 16.0 + 0.01;
            let forward = classify_orientation(angle.cos(), angle.sin(), 0.0);
            let back = classify_orientation((angle + PI).cos(), (angle + PI).sin(), 0.0);
            assert_eq!(forward, back, "angle {angle}");
        }
    }

    #[test]
    fn test_gradient_sample_vertical_boundary() {
        // Dark left column, light right column
        let img = GrayImage::from_fn(3, 3, |x, _| Luma([if x == 2 { 255 } else { 0 }]));
        let sample = GradientSample::at(&img, 1, 1).unwrap();
        assert_eq!(sample, GradientSample { sum_x: 1020, sum_y: 0 });
        assert_eq!(sample.classify(1.0), EdgeClass::Vertical);
    }

    #[test]
    fn test_gradient_sample_horizontal_boundary() {
        let img = GrayImage::from_fn(3, 3, |_, y| Luma([if y == 2 { 255 } else { 0 }]));
        let sample = GradientSample::at(&img, 1, 1).unwrap();
        assert_eq!(sample, GradientSample { sum_x: 0, sum_y: 1020 });
        assert_eq!(sample.classify(1.0), EdgeClass::Horizontal);
    }

    #[test]
    fn test_gradient_sample_diagonal_boundary() {
        // Light below the anti-diagonal: the edge runs bottom-left to top-right
        let img = GrayImage::from_fn(3, 3, |x, y| Luma([if x + y > 2 { 255 } else { 0 }]));
        assert_eq!(
            GradientSample::at(&img, 1, 1).unwrap().classify(1.0),
            EdgeClass::DiagonalUp
        );

        // Light above the main diagonal: the edge runs top-left to bottom-right
        let img = GrayImage::from_fn(3, 3, |x, y| Luma([if x > y { 255 } else { 0 }]));
        assert_eq!(
            GradientSample::at(&img, 1, 1).unwrap().classify(1.0),
            EdgeClass::DiagonalDown
        );
    }

    #[test]
    fn test_map_edges_borders_undetermined() {
        let img = GrayImage::from_fn(9, 7, |x, y| Luma([((x * 37 + y * 91) % 256) as u8]));
        let edges = map_edges(&img, 0.1).unwrap();
        assert_eq!((edges.width(), edges.height()), (9, 7));

        for x in 0..9 {
            assert_eq!(edges.get(x, 0), Some(EdgeClass::Undetermined));
            assert_eq!(edges.get(x, 6), Some(EdgeClass::Undetermined));
        }
        for y in 0..7 {
            assert_eq!(edges.get(0, y), Some(EdgeClass::Undetermined));
            assert_eq!(edges.get(8, y), Some(EdgeClass::Undetermined));
        }
        for y in 1..6 {
            for x in 1..8 {
                assert_ne!(edges.get(x, y), Some(EdgeClass::Undetermined));
            }
        }
        assert_eq!(edges.get(9, 0), None);
        assert_eq!(edges.get(0, 7), None);
    }

    #[test]
    fn test_map_edges_flat_image_has_no_edges() {
        let img = GrayImage::from_pixel(16, 16, Luma([200]));
        let edges = map_edges(&img, 0.0).unwrap();
        assert!(
            edges
                .cells()
                .iter()
                .all(|&c| matches!(c, EdgeClass::None | EdgeClass::Undetermined))
        );
    }

    #[test]
    fn test_map_edges_tiny_image() {
        let img = GrayImage::new(2, 5);
        let edges = map_edges(&img, 0.5).unwrap();
        assert!(edges.cells().iter().all(|&c| c == EdgeClass::Undetermined));
    }

    #[test]
    fn test_map_edges_invalid_threshold() {
        let img = GrayImage::new(8, 8);
        assert!(matches!(
            map_edges(&img, 1.5),
            Err(AsciiError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_map_edges_threshold_suppresses_weak_gradient() {
        // Step of 10 gives |sum_x| = 40, well under 0.15 * 1442
        let img = GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 100 } else { 110 }]));
        let edges = map_edges(&img, 0.15).unwrap();
        assert_eq!(edges.get(3, 3), Some(EdgeClass::None));

        let edges = map_edges(&img, 0.01).unwrap();
        assert_eq!(edges.get(3, 3), Some(EdgeClass::Vertical));
    }

    #[test]
    fn test_downscale_tie_prefers_horizontal() {
        use EdgeClass::*;
        let edges = map(2, 2, vec![Vertical, Horizontal, None, None]);
        let grid = downscale_edges(&edges, 1, 1.0, 0.05).unwrap();
        assert_eq!(grid.to_string(), "_");
    }

    #[test]
    fn test_downscale_tie_precedence_order() {
        use EdgeClass::*;
        let edges = map(2, 2, vec![DiagonalDown, DiagonalUp, DiagonalDown, DiagonalUp]);
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.0).unwrap().to_string(), "/");

        let edges = map(2, 2, vec![DiagonalUp, Vertical, Vertical, DiagonalUp]);
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.0).unwrap().to_string(), "|");
    }

    #[test]
    fn test_downscale_density_threshold() {
        use EdgeClass::*;
        let edges = map(2, 2, vec![Vertical, None, None, None]);
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.2).unwrap().to_string(), "|");
        // 1/4 is not strictly greater than 0.25
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.25).unwrap().to_string(), " ");
    }

    #[test]
    fn test_downscale_density_ignores_undetermined() {
        use EdgeClass::*;
        let edges = map(2, 2, vec![Vertical, Undetermined, Undetermined, Undetermined]);
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.9).unwrap().to_string(), "|");
    }

    #[test]
    fn test_downscale_all_undetermined_is_blank() {
        let edges = map(2, 2, vec![EdgeClass::Undetermined; 4]);
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.0).unwrap().to_string(), " ");
    }

    #[test]
    fn test_downscale_all_none_is_blank() {
        let edges = map(2, 2, vec![EdgeClass::None; 4]);
        assert_eq!(downscale_edges(&edges, 1, 1.0, 0.0).unwrap().to_string(), " ");
    }

    #[test]
    fn test_downscale_dimensions() {
        let edges = map(100, 50, vec![EdgeClass::None; 5000]);
        let grid = downscale_edges(&edges, 20, 2.0, 0.05).unwrap();
        assert_eq!(grid.dimensions(), (20, 5));
    }

    #[test]
    fn test_downscale_fractional_scale_stays_in_bounds() {
        let edges = map(37, 23, vec![EdgeClass::Vertical; 37 * 23]);
        let grid = downscale_edges(&edges, 10, 2.3, 0.05).unwrap();
        assert_eq!(grid.dimensions(), (10, 2));
        assert!(grid.cells().iter().all(|&c| c == '|'));
    }

    #[test]
    fn test_downscale_invalid_arguments() {
        let edges = map(4, 4, vec![EdgeClass::None; 16]);
        assert!(matches!(
            downscale_edges(&edges, 0, 1.0, 0.5),
            Err(AsciiError::Config(_))
        ));
        assert!(matches!(
            downscale_edges(&edges, 2, 0.0, 0.5),
            Err(AsciiError::Config(_))
        ));
        assert!(matches!(
            downscale_edges(&edges, 2, 1.0, 1.5),
            Err(AsciiError::Config(_))
        ));
    }

    #[test]
    fn test_edge_map_rejects_wrong_length() {
        assert!(EdgeMap::from_cells(3, 3, vec![EdgeClass::None; 8]).is_err());
    }

    #[test]
    fn test_gradient_sample_border_is_none() {
        let img = GrayImage::from_pixel(4, 3, Luma([90]));
        assert!(GradientSample::at(&img, 0, 1).is_none());
        assert!(GradientSample::at(&img, 3, 1).is_none());
        assert!(GradientSample::at(&img, 1, 0).is_none());
        assert!(GradientSample::at(&img, 1, 2).is_none());
        assert!(GradientSample::at(&img, 7, 7).is_none());
        assert_eq!(
            GradientSample::at(&img, 2, 1),
            Some(GradientSample { sum_x: 0, sum_y: 0 })
        );
    }

    #[test]
    fn test_tally_block_past_right_edge() {
        let edges = map(4, 1, vec![EdgeClass::Vertical; 4]);
        // Three columns per cell over two cells needs six source columns
        let scale = BlockScale {
            x_scale: 3.0,
            y_scale: 1.0,
            width: 2,
            height: 1,
        };
        assert!(tally_block(&edges, &scale, 0, 0).is_ok());
        assert_eq!(
            tally_block(&edges, &scale, 1, 0).unwrap_err(),
            AsciiError::OutOfRange {
                axis: "x",
                index: 4,
                len: 4,
            }
        );
    }

    #[test]
    fn test_tally_block_past_bottom_edge() {
        let edges = map(4, 1, vec![EdgeClass::Vertical; 4]);
        let scale = BlockScale {
            x_scale: 1.0,
            y_scale: 2.0,
            width: 4,
            height: 1,
        };
        assert_eq!(
            tally_block(&edges, &scale, 0, 0).unwrap_err(),
            AsciiError::OutOfRange {
                axis: "y",
                index: 1,
                len: 1,
            }
        );
    }
}
