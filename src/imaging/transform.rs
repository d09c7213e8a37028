//! Pixel work for each resize mode, on already-decoded images.
//!
//! Decoding and encoding live in the backend; everything here is
//! `DynamicImage -> DynamicImage` so it can be tested with in-memory images.

use super::calculations::{ResizePlan, center_crop_offsets, fill_placement};
use super::params::{Background, ResampleFilter, ResizeMode};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage, imageops};

/// Apply a planned resize to a decoded image.
pub fn apply_resize(
    img: &DynamicImage,
    plan: &ResizePlan,
    filter: ResampleFilter,
    background: Background,
) -> DynamicImage {
    match plan.mode {
        ResizeMode::Stretch | ResizeMode::Fit => scale(img, plan.output_size(), filter),
        ResizeMode::Fill => fill(img, plan.target, filter, background),
        ResizeMode::Crop => crop(img, plan.scaled, plan.target, filter),
    }
}

fn scale(img: &DynamicImage, (w, h): (u32, u32), filter: ResampleFilter) -> DynamicImage {
    if img.dimensions() == (w, h) {
        return img.clone();
    }
    img.resize_exact(w, h, filter.filter_type())
}

/// Fit inside the canvas without upscaling, then centre on the background.
///
/// Sources with alpha get an RGBA canvas and are blended onto it; everything
/// else is composited onto an opaque RGB canvas.
fn fill(
    img: &DynamicImage,
    canvas: (u32, u32),
    filter: ResampleFilter,
    background: Background,
) -> DynamicImage {
    let (w, h, x, y) = fill_placement(img.dimensions(), canvas);
    let fitted = scale(img, (w, h), filter);

    if img.color().has_alpha() {
        let mut base = RgbaImage::from_pixel(canvas.0, canvas.1, Rgba(background.rgba()));
        imageops::overlay(&mut base, &fitted.to_rgba8(), i64::from(x), i64::from(y));
        DynamicImage::ImageRgba8(base)
    } else {
        let mut base = RgbImage::from_pixel(canvas.0, canvas.1, Rgb(background.rgb()));
        imageops::replace(&mut base, &fitted.to_rgb8(), i64::from(x), i64::from(y));
        DynamicImage::ImageRgb8(base)
    }
}

/// Cover the target box, then trim the overflow evenly from both sides.
fn crop(
    img: &DynamicImage,
    scaled: (u32, u32),
    target: (u32, u32),
    filter: ResampleFilter,
) -> DynamicImage {
    let covered = scale(img, scaled, filter);
    let (x, y) = center_crop_offsets(scaled, target);
    let w = target.0.min(scaled.0);
    let h = target.1.min(scaled.1);
    covered.crop_imm(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::calculations::plan_resize;

    fn solid_rgb(w: u32, h: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
    }

    fn run(img: &DynamicImage, target: (u32, u32), mode: ResizeMode) -> DynamicImage {
        let plan = plan_resize(img.dimensions(), target, mode);
        apply_resize(img, &plan, ResampleFilter::Lanczos, Background::WHITE)
    }

    #[test]
    fn stretch_hits_exact_size() {
        let out = run(&solid_rgb(80, 60, [10, 20, 30]), (40, 40), ResizeMode::Stretch);
        assert_eq!(out.dimensions(), (40, 40));
    }

    #[test]
    fn fit_preserves_aspect() {
        let out = run(&solid_rgb(80, 60, [10, 20, 30]), (40, 40), ResizeMode::Fit);
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn fill_pads_with_background() {
        let out = run(&solid_rgb(80, 40, [0, 0, 0]), (40, 40), ResizeMode::Fill);
        assert_eq!(out.dimensions(), (40, 40));
        let rgb = out.to_rgb8();
        // Fitted to 40x20 at y=10: top and bottom bands are background
        assert_eq!(rgb.get_pixel(20, 2), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(20, 20), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(20, 37), &Rgb([255, 255, 255]));
    }

    #[test]
    fn fill_does_not_upscale() {
        let out = run(&solid_rgb(10, 10, [0, 0, 0]), (40, 40), ResizeMode::Fill);
        let rgb = out.to_rgb8();
        assert_eq!(rgb.get_pixel(5, 5), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(15, 15), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(24, 24), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(25, 25), &Rgb([255, 255, 255]));
    }

    #[test]
    fn fill_keeps_alpha_channel() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 10, Rgba([0, 0, 255, 255])));
        let plan = plan_resize((20, 10), (20, 20), ResizeMode::Fill);
        let out = apply_resize(&img, &plan, ResampleFilter::Nearest, Background([0, 0, 0, 0]));
        assert!(out.color().has_alpha());
        let rgba = out.to_rgba8();
        assert_eq!(rgba.get_pixel(10, 1), &Rgba([0, 0, 0, 0]));
        assert_eq!(rgba.get_pixel(10, 10), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn crop_trims_centre() {
        // Left half red, right half blue; a centred square crop keeps both
        let mut rgb = RgbImage::from_pixel(100, 50, Rgb([255, 0, 0]));
        for x in 50..100 {
            for y in 0..50 {
                rgb.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }
        let plan = plan_resize((100, 50), (50, 50), ResizeMode::Crop);
        let out = apply_resize(
            &DynamicImage::ImageRgb8(rgb),
            &plan,
            ResampleFilter::Nearest,
            Background::WHITE,
        );
        assert_eq!(out.dimensions(), (50, 50));
        let out = out.to_rgb8();
        assert_eq!(out.get_pixel(2, 25), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(47, 25), &Rgb([0, 0, 255]));
    }

    #[test]
    fn crop_id_photo_from_portrait() {
        let out = run(&solid_rgb(300, 400, [9, 9, 9]), (37, 50), ResizeMode::Crop);
        assert_eq!(out.dimensions(), (37, 50));
    }
}
