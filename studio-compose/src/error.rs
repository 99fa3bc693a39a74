// SPDX-License-Identifier: MIT
use fast_image_resize as fir;
use thiserror::Error;

/// Errors raised while decoding or compositing a poster.
///
/// None of these are retried; a failed export has to be started again.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Empty image: {w}x{h}")]
    EmptyImage { w: u32, h: u32 },

    #[error("Output buffer too small")]
    BufferTooSmall,

    #[error("Fast image resize error: {0}")]
    Resize(#[from] fir::ResizeError),

    #[error("Image buffer error: {0}")]
    ImageBuf(#[from] fir::ImageBufferError),

    #[error("Invalid font data: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}
