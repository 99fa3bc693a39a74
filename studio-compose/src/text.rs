// SPDX-License-Identifier: MIT
//! # Text Rasterization and Glow
//!
//! Text is rasterized with `ab_glyph` into a single-channel coverage mask, then painted
//! onto the poster through [`crate::blend::fill_mask`]. Keeping the mask separate lets
//! the glow passes reuse it: each pass blurs the same coverage by a larger radius.
//!
//! ## Glow Model
//!
//! A canvas `shadowBlur` of `b` pixels is approximated by a Gaussian with `σ = b / 2`.
//! For every blur radius the blurred mask is painted in the glow colour and the crisp
//! text is painted over it in the glow fill colour. A final pass with no blur paints the
//! text in the top colour.
//!
//! Positions follow canvas `fillText` conventions: `x` is the left edge of the first
//! glyph's advance box and `y` is the alphabetic baseline.

use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

use crate::blend::fill_mask;

/// Rasterized coverage for one run of text.
#[derive(Clone, Debug)]
pub struct TextMask {
    pub mask: GrayImage,
    /// Offset of the mask's top-left corner from the pen origin (left edge, baseline).
    pub offset_x: i64,
    pub offset_y: i64,
    /// Horizontal advance of the whole run.
    pub advance: f32,
}

impl TextMask {
    /// Wrap an existing coverage mask. Mostly useful for synthetic masks.
    pub fn from_mask(mask: GrayImage, offset_x: i64, offset_y: i64) -> Self {
        let advance = mask.width() as f32;
        Self {
            mask,
            offset_x,
            offset_y,
            advance,
        }
    }

    /// Grow the mask by `pad` pixels on every side so a blur has room to spread.
    pub fn padded(&self, pad: u32) -> TextMask {
        let mut mask = GrayImage::new(self.mask.width() + 2 * pad, self.mask.height() + 2 * pad);
        imageops::replace(&mut mask, &self.mask, i64::from(pad), i64::from(pad));
        TextMask {
            mask,
            offset_x: self.offset_x - i64::from(pad),
            offset_y: self.offset_y - i64::from(pad),
            advance: self.advance,
        }
    }

    /// Paint this mask with its pen origin at (`x`, `y`).
    pub fn paint(&self, canvas: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>) {
        fill_mask(
            canvas,
            &self.mask,
            x.round() as i64 + self.offset_x,
            y.round() as i64 + self.offset_y,
            color,
        );
    }
}

/// Fill and blur settings for glowing text.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowStyle {
    /// Shadow blur radii, drawn in order. Usually increasing.
    pub blurs: Vec<f32>,
    pub glow_color: Rgba<u8>,
    pub glow_fill: Rgba<u8>,
    pub top_fill: Rgba<u8>,
}

impl Default for GlowStyle {
    fn default() -> Self {
        Self {
            blurs: vec![40.0, 80.0],
            glow_color: Rgba([0xff, 0x00, 0x00, 0xff]),
            glow_fill: Rgba([0xff, 0x22, 0x22, 0xff]),
            top_fill: Rgba([0xff, 0xff, 0xff, 0xff]),
        }
    }
}

fn layout(font: &FontArc, text: &str, scale: PxScale) -> (Vec<Glyph>, f32) {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut last = None;
    let mut glyphs = Vec::with_capacity(text.len());

    for c in text.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = last {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
        caret += scaled.h_advance(id);
        last = Some(id);
    }
    (glyphs, caret)
}

/// Horizontal advance of `text` at `size` pixels.
pub fn text_width(font: &FontArc, text: &str, size: f32) -> f32 {
    layout(font, text, PxScale::from(size)).1
}

/// Rasterize `text` at `size` pixels into a coverage mask.
/// Returns `None` when nothing has an outline (empty or whitespace-only text).
pub fn rasterize(font: &FontArc, text: &str, size: f32) -> Option<TextMask> {
    let (glyphs, advance) = layout(font, text, PxScale::from(size));
    let outlined: Vec<_> = glyphs.into_iter().filter_map(|g| font.outline_glyph(g)).collect();

    let first = outlined.first()?.px_bounds();
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.min.x, first.min.y, first.max.x, first.max.y);
    for g in &outlined[1..] {
        let b = g.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let left = min_x.floor() as i64;
    let top = min_y.floor() as i64;
    let w = (max_x.ceil() as i64 - left).max(1) as u32;
    let h = (max_y.ceil() as i64 - top).max(1) as u32;
    let mut mask = GrayImage::new(w, h);

    for g in &outlined {
        let b = g.px_bounds();
        let gx = b.min.x as i64 - left;
        let gy = b.min.y as i64 - top;
        g.draw(|x, y, c| {
            let px = gx + i64::from(x);
            let py = gy + i64::from(y);
            if px < 0 || py < 0 || px >= i64::from(w) || py >= i64::from(h) {
                return;
            }
            let cell = mask.get_pixel_mut(px as u32, py as u32);
            let v = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            *cell = Luma([cell.0[0].saturating_add(v)]);
        });
    }

    Some(TextMask {
        mask,
        offset_x: left,
        offset_y: top,
        advance,
    })
}

/// Draw `text` once, with no blur, at (`x`, `y`). Returns the advance.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: Rgba<u8>,
) -> f32 {
    match rasterize(font, text, size) {
        Some(run) => {
            run.paint(canvas, x, y, color);
            run.advance
        }
        None => 0.0,
    }
}

/// Paint a rasterized run with its glow passes followed by the crisp top pass.
pub fn paint_glowing(canvas: &mut RgbaImage, run: &TextMask, x: f32, y: f32, style: &GlowStyle) {
    for &blur in &style.blurs {
        if blur > 0.0 {
            let sigma = blur / 2.0;
            let padded = run.padded((sigma * 3.0).ceil() as u32);
            let blurred = TextMask {
                mask: imageops::blur(&padded.mask, sigma),
                ..padded
            };
            blurred.paint(canvas, x, y, style.glow_color);
        }
        run.paint(canvas, x, y, style.glow_fill);
    }
    run.paint(canvas, x, y, style.top_fill);
}

/// Rasterize and draw glowing text at (`x`, `y`).
pub fn draw_glowing_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    style: &GlowStyle,
) {
    if let Some(run) = rasterize(font, text, size) {
        paint_glowing(canvas, &run, x, y, style);
    }
}
