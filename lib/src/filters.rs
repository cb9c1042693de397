use crate::config::DogParams;
use crate::error::{AsciiError, Result};
use image::{GrayImage, Luma, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use log::{debug, info};
use rayon::prelude::*;

/// Calculate luminance from an RGBA image using Rec. 601 weights
///
/// Formula: Y = (19595*R + 38470*G + 7471*B + 2^15) >> 24 on 16-bit channels,
/// roughly 0.299*R + 0.587*G + 0.114*B. Alpha is ignored.
///
/// # Arguments
/// * `img` - Input RGBA image
///
/// # Returns
/// Grayscale image with luminance values
pub fn calculate_luminance(img: &RgbaImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        // Widen 8-bit channels to 16 bits (0xff -> 0xffff)
        let r = pixel[0] as u32 * 257;
        let g = pixel[1] as u32 * 257;
        let b = pixel[2] as u32 * 257;

        let luminance = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24;
        output.put_pixel(x, y, Luma([luminance as u8]));
    }

    output
}

/// Apply a Gaussian blur with standard deviation `sigma`
///
/// A non-positive sigma leaves the image untouched.
pub fn gaussian_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        gaussian_blur_f32(img, sigma)
    } else {
        img.clone()
    }
}

/// Soft threshold for the XDoG response
///
/// Returns 1.0 when `u >= epsilon`, otherwise `1 + tanh(phi * (u - epsilon))`,
/// which falls smoothly towards 0 as `u` drops below `epsilon`.
///
/// # Errors
/// `InvalidParameter` if `epsilon` is outside [0, 1]
pub fn tanh_threshold(u: f32, epsilon: f32, phi: f32) -> Result<f32> {
    AsciiError::check_unit("epsilon", epsilon)?;
    Ok(soft_threshold(u, epsilon, phi))
}

fn soft_threshold(u: f32, epsilon: f32, phi: f32) -> f32 {
    if u >= epsilon {
        1.0
    } else {
        1.0 + (phi * (u - epsilon)).tanh()
    }
}

/// Compute the extended Difference of Gaussians (XDoG) of a grayscale image
///
/// D = (1 + tau) * blur(sigma1) - tau * blur(sigma2), soft-thresholded with
/// [`tanh_threshold`] and scaled back to 0..=255.
///
/// # Arguments
/// * `img` - Input grayscale image
/// * `params` - Blur scales and threshold shape
///
/// # Returns
/// Edge-emphasized grayscale image with the same dimensions as `img`
pub fn difference_of_gaussians(img: &GrayImage, params: &DogParams) -> Result<GrayImage> {
    AsciiError::check_unit("epsilon", params.epsilon)?;

    info!("Applying Difference of Gaussians");
    debug!(
        "DoG sigma1={} sigma2={} epsilon={} tau={} phi={}",
        params.sigma1, params.sigma2, params.epsilon, params.tau, params.phi
    );

    let (width, height) = img.dimensions();
    let blur1 = gaussian_blur(img, params.sigma1);
    let blur2 = gaussian_blur(img, params.sigma2);

    let mut output = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return Ok(output);
    }

    let row_len = width as usize;
    output
        .par_chunks_mut(row_len)
        .zip(blur1.par_chunks(row_len).zip(blur2.par_chunks(row_len)))
        .for_each(|(out_row, (row1, row2))| {
            for ((out, &p1), &p2) in out_row.iter_mut().zip(row1).zip(row2) {
                let g1 = p1 as f32 / 255.0;
                let g2 = p2 as f32 / 255.0;
                let u = (1.0 + params.tau) * g1 - params.tau * g2;
                let d = soft_threshold(u, params.epsilon, params.phi);
                *out = (255.0 * d).round().clamp(0.0, 255.0) as u8;
            }
        });

    Ok(output)
}
