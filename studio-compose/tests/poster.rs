// SPDX-License-Identifier: MIT
use fast_image_resize::Resizer;
use image::{Rgba, RgbaImage};
use rand::{SeedableRng, rngs::StdRng};
use studio_compose::{
    amount::{DEFAULT_BUCKETS, generate_amount, generate_money, select_bucket},
    filters::grayscale_in_place,
    geometry::{CanvasPreset, Size, crop_to_aspect},
    pipeline::{PortraitLayout, PosterInputs, PosterLayout, compose_poster, process_portrait},
};

fn colourful(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 200, 255]))
}

#[test]
fn test_portrait_is_always_slot_sized() {
    let mut resizer = Resizer::new();
    let layout = PortraitLayout::default();
    for (w, h) in [(1920, 1080), (1080, 1920), (481, 651), (64, 64), (3000, 200)] {
        let out = process_portrait(&mut resizer, &colourful(w, h), &layout).unwrap();
        assert_eq!(out.dimensions(), (480, 650), "source {w}x{h}");
    }
}

#[test]
fn test_portrait_grayscale_is_stable() {
    let mut resizer = Resizer::new();
    let out = process_portrait(&mut resizer, &colourful(800, 600), &PortraitLayout::default()).unwrap();
    let mut again = out.clone();
    grayscale_in_place(&mut again);
    assert_eq!(out, again);
}

#[test]
fn test_crop_matches_slot_aspect() {
    let target = Size::new(480, 650);
    for (w, h) in [(1920, 1080), (1080, 1920), (480, 650), (10, 5000)] {
        let crop = crop_to_aspect(Size::new(w, h), target);
        assert!((crop.w / crop.h - target.aspect()).abs() < 1e-9);
        assert!(crop.x >= 0.0 && crop.y >= 0.0);
        assert!(crop.x + crop.w <= f64::from(w) + 1e-9);
        assert!(crop.y + crop.h <= f64::from(h) + 1e-9);
    }
}

#[test]
fn test_poster_canvas_and_portrait_slot() {
    let mut resizer = Resizer::new();
    let photo = colourful(900, 1200);
    for preset in [CanvasPreset::Square, CanvasPreset::Portrait, CanvasPreset::Story] {
        let layout = PosterLayout {
            canvas: preset.size(),
            ..PosterLayout::default()
        };
        let poster = compose_poster(
            &mut resizer,
            &PosterInputs {
                photo: &photo,
                template: None,
                name: "Jane Doe",
                amount: "$12,345",
                font: None,
                layout: &layout,
            },
        )
        .unwrap();

        let size = preset.size();
        assert_eq!(poster.dimensions(), (size.w, size.h));

        // inside the portrait, away from the faded edges
        let top = size.h - 650 - 145;
        let px = poster.get_pixel(10, top + 10);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);

        // right of the portrait is untouched background
        assert_eq!(*poster.get_pixel(size.w - 1, 0), layout.background);
    }
}

#[test]
fn test_poster_uses_template_background() {
    let mut resizer = Resizer::new();
    let template = RgbaImage::from_pixel(200, 200, Rgba([0, 40, 200, 255]));
    let layout = PosterLayout::default();
    let poster = compose_poster(
        &mut resizer,
        &PosterInputs {
            photo: &colourful(300, 300),
            template: Some(&template),
            name: "",
            amount: "$0",
            font: None,
            layout: &layout,
        },
    )
    .unwrap();
    assert_eq!(*poster.get_pixel(1079, 0), Rgba([0, 40, 200, 255]));
}

#[test]
fn test_bucket_edges_select_earlier_bucket() {
    let weights = [40, 45, 15];
    assert_eq!(select_bucket(&weights, 0.0), 0);
    assert_eq!(select_bucket(&weights, 40.0), 0);
    assert_eq!(select_bucket(&weights, 40.000001), 1);
    assert_eq!(select_bucket(&weights, 85.0), 1);
    assert_eq!(select_bucket(&weights, 99.999), 2);
}

#[test]
fn test_seeded_amounts_repeat_and_stay_in_range() {
    let first: Vec<String> = {
        let mut rng = StdRng::seed_from_u64(7);
        (0..20).map(|_| generate_money(&mut rng)).collect()
    };
    let second: Vec<String> = {
        let mut rng = StdRng::seed_from_u64(7);
        (0..20).map(|_| generate_money(&mut rng)).collect()
    };
    assert_eq!(first, second);

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..1000 {
        let amount = generate_amount(&mut rng, &DEFAULT_BUCKETS);
        assert!((10_000..=3_000_000).contains(&amount));
    }
}
