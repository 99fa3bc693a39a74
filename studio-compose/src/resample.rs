// SPDX-License-Identifier: MIT
// CPU resampler built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, cropped source rectangle written straight into the caller's buffer.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};
use image::RgbaImage;

use crate::error::ComposeError;
use crate::geometry::{crop_to_aspect, CropRect, Size};

/// Resample `crop` of a tightly packed RGBA8 source into `dst`.
/// `dst` must be at least `out.w * out.h * 4` bytes.
pub fn resample_rgba(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    src: Size,
    crop: CropRect,
    out: Size,
    dst: &mut [u8],
) -> Result<(), ComposeError> {
    if src.w == 0 || src.h == 0 {
        return Err(ComposeError::EmptyImage { w: src.w, h: src.h });
    }
    if dst.len() < out.rgba_len() {
        return Err(ComposeError::BufferTooSmall);
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.w, src.h, src_rgba)?;
    let mut dst_image = TypedImage::<U8x4>::from_buffer(out.w, out.h, &mut dst[..out.rgba_len()])?;

    let opts = ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom))
        .crop(crop.x, crop.y, crop.w, crop.h)
        .use_alpha(false);

    resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
    Ok(())
}

/// Crop `src` to the aspect of `target` and resample it to exactly `target`.
pub fn crop_and_resample(
    resizer: &mut Resizer,
    src: &RgbaImage,
    target: Size,
) -> Result<RgbaImage, ComposeError> {
    let src_size = Size::new(src.width(), src.height());
    let crop = crop_to_aspect(src_size, target);

    let mut out = vec![0u8; target.rgba_len()];
    resample_rgba(resizer, src.as_raw(), src_size, crop, target, &mut out)?;

    RgbaImage::from_raw(target.w, target.h, out).ok_or(ComposeError::BufferTooSmall)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(px))
    }

    #[test]
    fn test_output_dimensions_are_exact() {
        let mut resizer = Resizer::new();
        let target = Size::new(480, 650);
        for &(w, h) in &[(1, 1), (2, 3), (1920, 1080), (720, 2400), (480, 650), (5000, 7)] {
            let out = crop_and_resample(&mut resizer, &solid(w, h, [10, 20, 30, 255]), target).unwrap();
            assert_eq!((out.width(), out.height()), (480, 650), "source {w}x{h}");
        }
    }

    #[test]
    fn test_solid_colour_survives_resampling() {
        let mut resizer = Resizer::new();
        let out = crop_and_resample(&mut resizer, &solid(300, 200, [200, 100, 50, 255]), Size::new(48, 65)).unwrap();
        let px = out.get_pixel(24, 32).0;
        assert_eq!(px, [200, 100, 50, 255]);
    }

    #[test]
    fn test_tall_source_samples_the_top() {
        // top half white, bottom half black; the crop keeps only the top band
        let mut src = solid(100, 1000, [0, 0, 0, 255]);
        for y in 0..500 {
            for x in 0..100 {
                src.put_pixel(x, y, image::Rgba([255, 255, 255, 255]));
            }
        }
        let mut resizer = Resizer::new();
        let out = crop_and_resample(&mut resizer, &src, Size::new(100, 100)).unwrap();
        assert_eq!(out.get_pixel(50, 50).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_rejects_small_destination() {
        let mut resizer = Resizer::new();
        let src = solid(4, 4, [0; 4]);
        let mut dst = vec![0u8; 8];
        let err = resample_rgba(
            &mut resizer,
            src.as_raw(),
            Size::new(4, 4),
            CropRect { x: 0.0, y: 0.0, w: 4.0, h: 4.0 },
            Size::new(2, 2),
            &mut dst,
        )
        .unwrap_err();
        assert!(matches!(err, ComposeError::BufferTooSmall));
    }
}
