// SPDX-License-Identifier: MIT
//! # Poster Compositing Pipeline
//!
//! Turns an uploaded photo into a finished poster:
//! 1. **Crop** the photo to the portrait slot's aspect ([`crate::geometry::crop_to_aspect`])
//! 2. **Resample** the crop to the slot size ([`crate::resample`])
//! 3. **Grayscale** ([`crate::filters::grayscale_in_place`])
//! 4. **Edge fades** on the right and bottom ([`crate::filters::apply_edge_fades`])
//! 5. **Text**: stacked name, glowing amount, caption lines ([`crate::text`])
//!
//! Only already-decoded images enter the pipeline. Decoding happens in [`decode_image`],
//! so a half-loaded bitmap can never be composited.

use ab_glyph::FontArc;
use fast_image_resize::Resizer;
use image::{imageops, Rgba, RgbaImage};
use tracing::debug;

use crate::blend::draw_image_over;
use crate::error::ComposeError;
use crate::filters::{apply_edge_fades, grayscale_in_place, EdgeFades};
use crate::geometry::Size;
use crate::resample::crop_and_resample;
use crate::text::{draw_glowing_text, draw_text, GlowStyle};

/// Decode an encoded upload (PNG, JPEG, ...) into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, ComposeError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(ComposeError::EmptyImage {
            w: img.width(),
            h: img.height(),
        });
    }
    Ok(img)
}

/// Portrait slot configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortraitLayout {
    pub size: Size,
    pub fades: EdgeFades,
}

impl Default for PortraitLayout {
    fn default() -> Self {
        Self {
            size: Size::new(480, 650),
            fades: EdgeFades::default(),
        }
    }
}

/// Crop, resample, grayscale and fade a photo into the portrait slot.
pub fn process_portrait(
    resizer: &mut Resizer,
    photo: &RgbaImage,
    layout: &PortraitLayout,
) -> Result<RgbaImage, ComposeError> {
    let mut portrait = crop_and_resample(resizer, photo, layout.size)?;
    grayscale_in_place(&mut portrait);
    apply_edge_fades(&mut portrait, &layout.fades);
    Ok(portrait)
}

/// One static line drawn under the amount.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLine {
    pub text: String,
    pub size: f32,
    /// Vertical step taken after this line.
    pub advance: f32,
    pub color: Rgba<u8>,
}

impl CaptionLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 26.0,
            advance: 35.0,
            color: Rgba([255, 255, 255, 255]),
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_advance(mut self, advance: f32) -> Self {
        self.advance = advance;
        self
    }

    /// Set opacity from 0.0 to 1.0, keeping the colour.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.color.0[3] = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        self
    }
}

/// Positions and sizes of every element on the poster.
#[derive(Clone, Debug, PartialEq)]
pub struct PosterLayout {
    pub canvas: Size,
    pub background: Rgba<u8>,
    pub portrait: PortraitLayout,
    /// Gap between the portrait's bottom edge and the canvas bottom.
    pub portrait_bottom_margin: u32,
    pub text_x: f32,
    pub text_top: f32,
    pub name_size: f32,
    pub name_step: f32,
    pub gap_after_name: f32,
    pub amount_size: f32,
    pub gap_after_amount: f32,
    pub glow: GlowStyle,
    pub captions: Vec<CaptionLine>,
}

impl Default for PosterLayout {
    fn default() -> Self {
        Self {
            canvas: Size::new(1080, 1080),
            background: Rgba([12, 12, 14, 255]),
            portrait: PortraitLayout::default(),
            portrait_bottom_margin: 145,
            text_x: 520.0,
            text_top: 240.0,
            name_size: 68.0,
            name_step: 75.0,
            gap_after_name: 40.0,
            amount_size: 70.0,
            gap_after_amount: 55.0,
            glow: GlowStyle::default(),
            captions: Vec::new(),
        }
    }
}

/// Everything a poster render needs.
pub struct PosterInputs<'a> {
    pub photo: &'a RgbaImage,
    /// Optional background template, stretched over the whole canvas.
    pub template: Option<&'a RgbaImage>,
    pub name: &'a str,
    pub amount: &'a str,
    /// Without a font the text pass is skipped.
    pub font: Option<&'a FontArc>,
    pub layout: &'a PosterLayout,
}

/// Baselines of each text element, in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPlan {
    pub name_lines: Vec<(String, f32)>,
    pub amount_y: f32,
    pub caption_ys: Vec<f32>,
}

/// Compute the text baselines for `name`. The name is upper-cased and stacked one word
/// per line.
pub fn plan_text(name: &str, layout: &PosterLayout) -> TextPlan {
    let mut y = layout.text_top;
    let mut name_lines = Vec::new();
    for word in name.trim().to_uppercase().split_whitespace() {
        name_lines.push((word.to_string(), y));
        y += layout.name_step;
    }
    y += layout.gap_after_name;
    let amount_y = y;
    y += layout.gap_after_amount;

    let mut caption_ys = Vec::with_capacity(layout.captions.len());
    for caption in &layout.captions {
        caption_ys.push(y);
        y += caption.advance;
    }
    TextPlan {
        name_lines,
        amount_y,
        caption_ys,
    }
}

/// Render the full poster.
pub fn compose_poster(resizer: &mut Resizer, inputs: &PosterInputs<'_>) -> Result<RgbaImage, ComposeError> {
    let layout = inputs.layout;
    let canvas_size = layout.canvas;

    let mut canvas = match inputs.template {
        Some(template) => imageops::resize(template, canvas_size.w, canvas_size.h, imageops::FilterType::Triangle),
        None => RgbaImage::from_pixel(canvas_size.w, canvas_size.h, layout.background),
    };

    let portrait = process_portrait(resizer, inputs.photo, &layout.portrait)?;
    let top = i64::from(canvas_size.h) - i64::from(portrait.height()) - i64::from(layout.portrait_bottom_margin);
    draw_image_over(&mut canvas, &portrait, 0, top);
    debug!(w = portrait.width(), h = portrait.height(), top, "portrait placed");

    if let Some(font) = inputs.font {
        let plan = plan_text(inputs.name, layout);
        let white = Rgba([255, 255, 255, 255]);
        for (line, y) in &plan.name_lines {
            draw_text(&mut canvas, font, line, layout.text_x, *y, layout.name_size, white);
        }
        draw_glowing_text(
            &mut canvas,
            font,
            inputs.amount,
            layout.text_x,
            plan.amount_y,
            layout.amount_size,
            &layout.glow,
        );
        for (caption, y) in layout.captions.iter().zip(&plan.caption_ys) {
            draw_text(&mut canvas, font, &caption.text, layout.text_x, *y, caption.size, caption.color);
        }
    } else {
        debug!("no font supplied, skipping text pass");
    }

    Ok(canvas)
}
