// SPDX-License-Identifier: MIT
//! Per-pixel filters applied to the portrait after resampling.
//!
//! - [`grayscale_in_place`]: BT.601 luma replaces the colour channels
//! - [`apply_edge_fades`]: erases alpha towards the right and bottom edges so the
//!   portrait blends into whatever background it is drawn over

use image::RgbaImage;

/// Convert to grayscale with `Y = 0.299R + 0.587G + 0.114B`. Alpha is untouched.
///
/// Applying it twice gives the same bitmap as applying it once: the weights sum to
/// one, so a gray pixel maps to itself.
pub fn grayscale_in_place(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let [r, g, b, _] = px.0;
        let y = luma(r, g, b);
        px.0[0] = y;
        px.0[1] = y;
        px.0[2] = y;
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

/// A three-stop erase ramp: nothing erased at the start, `midpoint_opacity` erased
/// halfway, everything erased at the boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeRamp {
    /// Length of the ramp in pixels, measured inwards from the edge.
    pub extent: u32,
    /// Fraction of alpha erased at the middle of the ramp (0.0–1.0).
    pub midpoint_opacity: f32,
}

impl FadeRamp {
    pub const fn new(extent: u32, midpoint_opacity: f32) -> Self {
        Self {
            extent,
            midpoint_opacity,
        }
    }

    /// Erase amount at ramp position `t` in `[0, 1]`.
    pub fn erase_at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let mid = self.midpoint_opacity.clamp(0.0, 1.0);
        if t <= 0.5 {
            mid * (t / 0.5)
        } else {
            mid + (1.0 - mid) * ((t - 0.5) / 0.5)
        }
    }

    /// Erase amount for pixel `index` along an axis of length `len`.
    /// Sampled at the pixel centre; pixels before the ramp start return 0.
    fn erase_for_pixel(&self, index: u32, len: u32) -> f32 {
        if self.extent == 0 {
            return 0.0;
        }
        let extent = self.extent.min(len) as f32;
        let start = len as f32 - extent;
        let centre = index as f32 + 0.5;
        if centre <= start {
            return 0.0;
        }
        self.erase_at((centre - start) / extent)
    }
}

/// Edge fades for a portrait: one ramp on the right edge, one on the bottom edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeFades {
    pub right: Option<FadeRamp>,
    pub bottom: Option<FadeRamp>,
}

impl Default for EdgeFades {
    fn default() -> Self {
        Self {
            right: Some(FadeRamp::new(180, 0.3)),
            bottom: Some(FadeRamp::new(150, 0.4)),
        }
    }
}

/// Erase alpha along the configured edges (destination-out semantics).
///
/// The two ramps are independent: a corner pixel keeps `(1 - right) * (1 - bottom)`
/// of its original alpha.
pub fn apply_edge_fades(img: &mut RgbaImage, fades: &EdgeFades) {
    let (w, h) = img.dimensions();

    let column_keep: Vec<f32> = (0..w)
        .map(|x| 1.0 - fades.right.map_or(0.0, |r| r.erase_for_pixel(x, w)))
        .collect();
    let row_keep: Vec<f32> = (0..h)
        .map(|y| 1.0 - fades.bottom.map_or(0.0, |b| b.erase_for_pixel(y, h)))
        .collect();

    for (x, y, px) in img.enumerate_pixels_mut() {
        let keep = column_keep[x as usize] * row_keep[y as usize];
        if keep < 1.0 {
            px.0[3] = (f32::from(px.0[3]) * keep).round() as u8;
        }
    }
}
