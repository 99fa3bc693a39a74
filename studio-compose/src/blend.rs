// SPDX-License-Identifier: MIT
// Straight-alpha "source-over" compositing helpers shared by the portrait, text and landmark passes.

use image::{GrayImage, Rgba, RgbaImage};

/// Blend `src` over `dst`, scaling the source alpha by `coverage` (0.0–1.0).
#[inline]
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let sa = f32::from(src.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let sc = f32::from(src.0[i]);
        let dc = f32::from(dst.0[i]);
        let c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        dst.0[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Draw `img` over `canvas` with its top-left corner at (`left`, `top`). Clipped to the canvas.
pub fn draw_image_over(canvas: &mut RgbaImage, img: &RgbaImage, left: i64, top: i64) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for (x, y, px) in img.enumerate_pixels() {
        let cx = left + i64::from(x);
        let cy = top + i64::from(y);
        if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
            continue;
        }
        blend_over(canvas.get_pixel_mut(cx as u32, cy as u32), *px, 1.0);
    }
}

/// Paint `color` through a coverage mask whose top-left lands at (`left`, `top`).
pub fn fill_mask(canvas: &mut RgbaImage, mask: &GrayImage, left: i64, top: i64, color: Rgba<u8>) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for (x, y, cov) in mask.enumerate_pixels() {
        if cov.0[0] == 0 {
            continue;
        }
        let cx = left + i64::from(x);
        let cy = top + i64::from(y);
        if cx < 0 || cy < 0 || cx >= cw || cy >= ch {
            continue;
        }
        blend_over(canvas.get_pixel_mut(cx as u32, cy as u32), color, f32::from(cov.0[0]) / 255.0);
    }
}
