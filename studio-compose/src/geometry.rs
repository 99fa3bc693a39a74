// SPDX-License-Identifier: MIT
//! # Crop Planning and Canvas Presets
//!
//! This module computes the source rectangle that is cut out of an uploaded photo
//! before it is resampled into the fixed portrait slot of a poster.
//!
//! ## Crop Strategy
//!
//! The crop always matches the aspect ratio of the target slot:
//! 1. **Wider than target**: trim equally from the left and right edges
//! 2. **Taller than target**: keep the top rows and trim from the bottom, so a face
//!    near the top of the frame survives
//!
//! There is no upscaling guard. A tiny source is simply stretched by the resampler.
//!
//! All computations stay in `f64` until the resampler consumes them, matching the
//! sub-pixel source rectangles a 2-D canvas accepts.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Width over height. Zero-height sizes are treated as one pixel tall.
    pub fn aspect(self) -> f64 {
        f64::from(self.w) / f64::from(self.h.max(1))
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        (self.w as usize) * (self.h as usize) * 4
    }
}

/// Sub-pixel source rectangle in source image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Compute the crop rectangle that gives `src` the aspect ratio of `target`.
///
/// # Arguments
/// * `src` - Decoded source dimensions
/// * `target` - Dimensions of the slot the crop will be resampled into
///
/// # Returns
/// A rectangle fully inside the source; `w / h` equals `target.aspect()` up to
/// floating-point error.
pub fn crop_to_aspect(src: Size, target: Size) -> CropRect {
    let (w, h) = (f64::from(src.w), f64::from(src.h));
    let target_aspect = target.aspect();

    if src.aspect() > target_aspect {
        let crop_w = h * target_aspect;
        CropRect {
            x: (w - crop_w) / 2.0,
            y: 0.0,
            w: crop_w,
            h,
        }
    } else {
        CropRect {
            x: 0.0,
            y: 0.0,
            w,
            h: w / target_aspect,
        }
    }
}

/// Output canvas presets for generated posters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CanvasPreset {
    /// 1080×1080 square feed post
    #[clap(name = "square")]
    Square,
    /// 1080×1350 portrait feed post
    #[clap(name = "portrait")]
    Portrait,
    /// 1080×1920 full-screen story
    #[clap(name = "story")]
    Story,
}

impl CanvasPreset {
    pub fn size(self) -> Size {
        match self {
            CanvasPreset::Square => Size::new(1080, 1080),
            CanvasPreset::Portrait => Size::new(1080, 1350),
            CanvasPreset::Story => Size::new(1080, 1920),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOT: Size = Size { w: 480, h: 650 };

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_wide_source_is_cropped_symmetrically() {
        let crop = crop_to_aspect(Size::new(2000, 650), SLOT);
        assert_close(crop.h, 650.0);
        assert_close(crop.w, 480.0);
        assert_close(crop.x, (2000.0 - 480.0) / 2.0);
        assert_close(crop.y, 0.0);
    }

    #[test]
    fn test_tall_source_keeps_the_top() {
        let crop = crop_to_aspect(Size::new(960, 4000), SLOT);
        assert_close(crop.x, 0.0);
        assert_close(crop.y, 0.0);
        assert_close(crop.w, 960.0);
        assert_close(crop.h, 1300.0);
    }

    #[test]
    fn test_matching_aspect_is_untouched() {
        let crop = crop_to_aspect(Size::new(960, 1300), SLOT);
        assert_close(crop.w, 960.0);
        assert_close(crop.h, 1300.0);
    }

    #[test]
    fn test_crop_matches_target_aspect() {
        for &(w, h) in &[(1, 1), (3, 2000), (4000, 3), (640, 480), (1080, 1920)] {
            let crop = crop_to_aspect(Size::new(w, h), SLOT);
            assert!((crop.w / crop.h - SLOT.aspect()).abs() < 1e-9);
            assert!(crop.x >= 0.0 && crop.x + crop.w <= f64::from(w) + 1e-9);
            assert!(crop.y + crop.h <= f64::from(h) + 1e-9);
        }
    }

    #[test]
    fn test_presets() {
        assert_eq!(CanvasPreset::Square.size(), Size::new(1080, 1080));
        assert_eq!(CanvasPreset::Story.size().rgba_len(), 1080 * 1920 * 4);
    }
}
