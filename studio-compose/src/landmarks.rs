// SPDX-License-Identifier: MIT
//! Cosmetic overlay of facial landmark points produced by an external detector.
//!
//! Points arrive in source-image pixels and are scaled onto the overlay canvas. The
//! overlay is revealed progressively: `progress` in `[0, 1]` selects how many points are
//! drawn, and once past [`OUTLINE_THRESHOLD`] the standard 68-point contours are traced.

use std::ops::Range;
use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::blend::blend_over;
use crate::geometry::Size;

/// Progress after which contour lines are drawn.
pub const OUTLINE_THRESHOLD: f32 = 0.3;

const POINT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 230]);
const LINE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 64]);
const POINT_RADIUS: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A contour of the 68-point layout; closed contours connect back to their first point.
struct Contour {
    range: Range<usize>,
    closed: bool,
}

const CONTOURS: [Contour; 8] = [
    Contour { range: 0..17, closed: false },  // jaw
    Contour { range: 17..22, closed: false }, // left brow
    Contour { range: 22..27, closed: false }, // right brow
    Contour { range: 27..31, closed: false }, // nose bridge
    Contour { range: 31..36, closed: false }, // nose base
    Contour { range: 36..42, closed: true },  // left eye
    Contour { range: 42..48, closed: true },  // right eye
    Contour { range: 48..60, closed: true },  // outer lips
];

/// Number of points visible at `progress`.
pub fn visible_points(total: usize, progress: f32) -> usize {
    ((total as f32) * progress.clamp(0.0, 1.0)).floor() as usize
}

/// Draw the overlay for `points` (in `source` coordinates) onto a transparent `canvas`.
pub fn draw_landmarks(canvas: &mut RgbaImage, points: &[Point], source: Size, progress: f32) {
    for px in canvas.pixels_mut() {
        *px = Rgba([0, 0, 0, 0]);
    }
    if points.is_empty() || source.w == 0 || source.h == 0 {
        return;
    }

    let sx = canvas.width() as f32 / source.w as f32;
    let sy = canvas.height() as f32 / source.h as f32;
    let scaled: Vec<Point> = points
        .iter()
        .map(|p| Point {
            x: p.x * sx,
            y: p.y * sy,
        })
        .collect();
    let shown = visible_points(scaled.len(), progress);

    for p in &scaled[..shown] {
        fill_disc(canvas, *p, POINT_RADIUS, POINT_COLOR);
    }

    if progress > OUTLINE_THRESHOLD {
        for contour in &CONTOURS {
            let end = contour.range.end.min(shown);
            if contour.range.start >= end {
                continue;
            }
            let segment = &scaled[contour.range.start..end];
            for pair in segment.windows(2) {
                draw_line(canvas, pair[0], pair[1], LINE_COLOR);
            }
            if contour.closed && shown >= contour.range.end {
                draw_line(canvas, segment[segment.len() - 1], segment[0], LINE_COLOR);
            }
        }
    }
}

/// Progress values for a reveal animation of `duration` at a fixed `frame` interval.
/// Always ends with exactly `1.0`.
pub fn reveal_steps(duration: Duration, frame: Duration) -> Vec<f32> {
    if duration.is_zero() || frame.is_zero() {
        return vec![1.0];
    }
    let total = duration.as_nanos();
    let step = frame.as_nanos();
    let frames = total.div_ceil(step);
    (1..=frames)
        .map(|i| ((i * step) as f64 / total as f64).min(1.0) as f32)
        .collect()
}

fn fill_disc(canvas: &mut RgbaImage, c: Point, r: f32, color: Rgba<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let x0 = (c.x - r).floor() as i64;
    let x1 = (c.x + r).ceil() as i64;
    let y0 = (c.y - r).floor() as i64;
    let y1 = (c.y + r).ceil() as i64;
    for y in y0.max(0)..y1.min(h) {
        for x in x0.max(0)..x1.min(w) {
            let dx = x as f32 + 0.5 - c.x;
            let dy = y as f32 + 0.5 - c.y;
            let coverage = (r + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_over(canvas.get_pixel_mut(x as u32, y as u32), color, coverage);
            }
        }
    }
}

fn draw_line(canvas: &mut RgbaImage, a: Point, b: Point, color: Rgba<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (a.x + (b.x - a.x) * t).floor() as i64;
        let y = (a.y + (b.y - a.y) * t).floor() as i64;
        if x >= 0 && y >= 0 && x < w && y < h {
            blend_over(canvas.get_pixel_mut(x as u32, y as u32), color, 1.0);
        }
    }
}
