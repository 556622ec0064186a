//! Privacy watermark: composite a semi-transparent rotated text layer onto
//! an image.
//!
//! Only the text layer is ever rotated, never the base image. The layer's
//! canvas is expanded to its diagonal before rotating so no glyph is
//! clipped, and placement anchors the *rotated* bounding box to the chosen
//! corner, so the watermark stays visually pinned despite rotation-induced
//! canvas growth.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage, RgbImage};
use imageproc::drawing::draw_text_mut;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Watermark text used when the caller supplies an empty string.
pub const DEFAULT_TEXT: &str = "SAFE SHARE";

/// Distance in pixels between the watermark bounding box and the image edge.
const CORNER_INSET: i64 = 20;

/// Text height as a fraction of the image's shorter dimension.
const HEIGHT_DIVISOR: u32 = 12;

/// Minimum text height in pixels, for very small images.
const MIN_TEXT_HEIGHT: u32 = 8;

/// TrueType fonts probed when no explicit font path is given.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Corner of the image where the watermark is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    /// Inset from the top-left corner.
    TopLeft,
    /// Inset from the top-right corner.
    TopRight,
    /// Inset from the bottom-left corner.
    BottomLeft,
    /// Inset from the bottom-right corner (the default).
    #[default]
    BottomRight,
}

impl Corner {
    /// Resolve a corner from its kebab-case name.
    ///
    /// Unrecognized names fall back to [`Corner::BottomRight`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "top-left" => Self::TopLeft,
            "top-right" => Self::TopRight,
            "bottom-left" => Self::BottomLeft,
            _ => Self::BottomRight,
        }
    }

    /// The kebab-case name of this corner.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for [`apply_watermark`].
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// Watermark text. An empty string falls back to [`DEFAULT_TEXT`].
    pub text: String,
    /// Text opacity, 0 (invisible) to 255 (fully opaque).
    pub opacity: u8,
    /// Rotation of the text layer in degrees; positive is counter-clockwise.
    pub angle_degrees: f32,
    /// Image corner the watermark is anchored to.
    pub corner: Corner,
    /// Explicit TrueType font file. When `None`, well-known system fonts
    /// are probed, and the built-in bitmap font is used as a last resort.
    pub font_path: Option<PathBuf>,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            opacity: 120,
            angle_degrees: 30.0,
            corner: Corner::default(),
            font_path: None,
        }
    }
}

/// Composite a semi-transparent text watermark onto `image`.
///
/// Opacity 0 returns a pixel-identical copy of the input. Font loading
/// failures are recovered internally by falling back to the built-in
/// bitmap font; this function never fails.
#[must_use]
pub fn apply_watermark(image: &RgbImage, opts: &WatermarkOptions) -> RgbImage {
    if opts.opacity == 0 {
        return image.clone();
    }

    let text = if opts.text.is_empty() {
        DEFAULT_TEXT
    } else {
        opts.text.as_str()
    };

    let (img_w, img_h) = (image.width(), image.height());
    let text_height = (img_w.min(img_h) / HEIGHT_DIVISOR).max(MIN_TEXT_HEIGHT);

    let font = resolve_font(opts.font_path.as_deref());
    let layer = render_text_layer(text, text_height, opts.opacity, &font);
    let (tw, th) = (layer.width(), layer.height());

    let angle = opts.angle_degrees.rem_euclid(360.0);
    let (canvas, bbox_w, bbox_h) = if angle == 0.0 {
        (layer, tw, th)
    } else {
        rotate_layer(&layer, angle)
    };

    // Anchor the rotated bounding box to the chosen corner, clamped so it
    // stays inside the image whenever it fits at all.
    let (bx, by) = corner_position(opts.corner, img_w, img_h, bbox_w, bbox_h);

    // The square rotation canvas is centered on the bounding box.
    let canvas_x = bx + i64::from(bbox_w / 2) - i64::from(canvas.width() / 2);
    let canvas_y = by + i64::from(bbox_h / 2) - i64::from(canvas.height() / 2);

    let mut base = image::DynamicImage::ImageRgb8(image.clone()).to_rgba8();
    image::imageops::overlay(&mut base, &canvas, canvas_x, canvas_y);
    image::DynamicImage::ImageRgba8(base).to_rgb8()
}

/// Top-left coordinate of a `bw` x `bh` box inset from the given corner of
/// a `w` x `h` image, clamped into the image.
fn corner_position(corner: Corner, w: u32, h: u32, bw: u32, bh: u32) -> (i64, i64) {
    let (w, h) = (i64::from(w), i64::from(h));
    let (bw, bh) = (i64::from(bw), i64::from(bh));

    let x = match corner {
        Corner::TopLeft | Corner::BottomLeft => CORNER_INSET,
        Corner::TopRight | Corner::BottomRight => w - bw - CORNER_INSET,
    };
    let y = match corner {
        Corner::TopLeft | Corner::TopRight => CORNER_INSET,
        Corner::BottomLeft | Corner::BottomRight => h - bh - CORNER_INSET,
    };

    (x.clamp(0, (w - bw).max(0)), y.clamp(0, (h - bh).max(0)))
}

/// Rotate the text layer counter-clockwise by `angle` degrees on a square
/// canvas large enough that no glyph is clipped.
///
/// Returns the rotated canvas and the axis-aligned dimensions of the
/// rotated text bounding box within it.
fn rotate_layer(layer: &RgbaImage, angle: f32) -> (RgbaImage, u32, u32) {
    let (tw, th) = (layer.width(), layer.height());
    let diagonal = f64::from(tw).hypot(f64::from(th)).ceil() as u32;

    let mut canvas = RgbaImage::from_pixel(diagonal, diagonal, Rgba([255, 255, 255, 0]));
    image::imageops::overlay(
        &mut canvas,
        layer,
        i64::from((diagonal - tw) / 2),
        i64::from((diagonal - th) / 2),
    );

    // imageproc rotates clockwise for positive theta; negate for the
    // counter-clockwise convention of the public API.
    let radians = -angle.to_radians();
    let rotated = rotate_about_center(
        &canvas,
        radians,
        Interpolation::Bilinear,
        Rgba([255, 255, 255, 0]),
    );

    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let bbox_w = ((tw as f32) * cos + (th as f32) * sin).ceil() as u32;
    let bbox_h = ((tw as f32) * sin + (th as f32) * cos).ceil() as u32;

    (rotated, bbox_w.min(diagonal), bbox_h.min(diagonal))
}

/// A loaded text face: a TrueType font or the built-in bitmap fallback.
enum TextFont {
    Truetype(FontVec),
    Bitmap,
}

/// Load a usable font: the explicit path first, then well-known system
/// locations, then the built-in 8x8 bitmap font. Never fails.
fn resolve_font(explicit: Option<&Path>) -> TextFont {
    let candidates = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_PATHS.iter().copied().map(PathBuf::from));

    for path in candidates {
        if let Ok(bytes) = std::fs::read(&path) {
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                return TextFont::Truetype(font);
            }
        }
    }

    TextFont::Bitmap
}

/// Render white text at the given opacity onto a tight transparent layer.
///
/// Transparent pixels keep white RGB so bilinear rotation interpolates
/// alpha only, without dark fringes around glyph edges.
fn render_text_layer(text: &str, height_px: u32, opacity: u8, font: &TextFont) -> RgbaImage {
    match font {
        TextFont::Truetype(font) => render_truetype(text, height_px, opacity, font),
        TextFont::Bitmap => render_bitmap(text, height_px, opacity),
    }
}

fn render_truetype(text: &str, height_px: u32, opacity: u8, font: &FontVec) -> RgbaImage {
    let scale = PxScale::from(height_px as f32);
    let scaled = font.as_scaled(scale);

    let mut width = 0.0f32;
    let mut previous = None;
    for ch in text.chars() {
        let glyph = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, glyph);
        }
        width += scaled.h_advance(glyph);
        previous = Some(glyph);
    }

    let layer_w = (width.ceil() as u32).max(1);
    let layer_h = (scaled.height().ceil() as u32).max(height_px).max(1);

    let mut layer = RgbaImage::from_pixel(layer_w, layer_h, Rgba([255, 255, 255, 0]));
    draw_text_mut(
        &mut layer,
        Rgba([255, 255, 255, opacity]),
        0,
        0,
        scale,
        font,
        text,
    );
    layer
}

fn render_bitmap(text: &str, height_px: u32, opacity: u8) -> RgbaImage {
    let glyph_scale = (height_px / 8).max(1);
    let glyphs: Vec<[u8; 8]> = text
        .chars()
        .map(|ch| {
            let index = if ch.is_ascii() { ch as usize } else { b'?' as usize };
            font8x8::legacy::BASIC_LEGACY[index]
        })
        .collect();

    let layer_w = (glyphs.len() as u32 * 8 * glyph_scale).max(1);
    let layer_h = 8 * glyph_scale;
    let mut layer = RgbaImage::from_pixel(layer_w, layer_h, Rgba([255, 255, 255, 0]));
    let on = Rgba([255, 255, 255, opacity]);

    for (i, glyph) in glyphs.iter().enumerate() {
        let origin_x = i as u32 * 8 * glyph_scale;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u32 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                for dy in 0..glyph_scale {
                    for dx in 0..glyph_scale {
                        let x = origin_x + col * glyph_scale + dx;
                        let y = row as u32 * glyph_scale + dy;
                        layer.put_pixel(x, y, on);
                    }
                }
            }
        }
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, image::Rgb([40, 40, 40]))
    }

    fn changed_bbox(before: &RgbImage, after: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for (x, y, px) in after.enumerate_pixels() {
            if px != before.get_pixel(x, y) {
                bbox = Some(match bbox {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bbox
    }

    #[test]
    fn zero_opacity_is_identity() {
        let img = base_image(200, 150);
        let opts = WatermarkOptions {
            opacity: 0,
            ..WatermarkOptions::default()
        };
        let out = apply_watermark(&img, &opts);
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = base_image(317, 203);
        let out = apply_watermark(&img, &WatermarkOptions::default());
        assert_eq!((out.width(), out.height()), (317, 203));
    }

    #[test]
    fn watermark_is_visible_at_full_opacity() {
        let img = base_image(400, 300);
        let opts = WatermarkOptions {
            opacity: 255,
            angle_degrees: 0.0,
            ..WatermarkOptions::default()
        };
        let out = apply_watermark(&img, &opts);
        assert!(changed_bbox(&img, &out).is_some(), "watermark left no trace");
    }

    #[test]
    fn corner_placement_lands_in_matching_quadrant() {
        let img = base_image(600, 600);
        for (corner, right, bottom) in [
            (Corner::TopLeft, false, false),
            (Corner::TopRight, true, false),
            (Corner::BottomLeft, false, true),
            (Corner::BottomRight, true, true),
        ] {
            let opts = WatermarkOptions {
                text: "HI".to_string(),
                opacity: 255,
                angle_degrees: 0.0,
                corner,
                font_path: None,
            };
            let out = apply_watermark(&img, &opts);
            let (x0, y0, x1, y1) =
                changed_bbox(&img, &out).expect("watermark left no trace");

            if right {
                assert!(x0 >= 300, "{corner}: bbox starts at {x0}, expected right half");
            } else {
                assert!(x1 < 300, "{corner}: bbox ends at {x1}, expected left half");
            }
            if bottom {
                assert!(y0 >= 300, "{corner}: bbox starts at {y0}, expected bottom half");
            } else {
                assert!(y1 < 300, "{corner}: bbox ends at {y1}, expected top half");
            }
        }
    }

    #[test]
    fn rotated_watermark_stays_inside_the_image() {
        let img = base_image(600, 600);
        let opts = WatermarkOptions {
            text: "HI".to_string(),
            opacity: 255,
            angle_degrees: 45.0,
            corner: Corner::BottomRight,
            font_path: None,
        };
        let out = apply_watermark(&img, &opts);
        let (x0, y0, x1, y1) = changed_bbox(&img, &out).expect("watermark left no trace");

        // The box is inset 20 px from the corner; allow a few pixels of
        // interpolation spread but nothing may reach the image edge.
        assert!(x0 >= 5 && y0 >= 5, "bbox ({x0},{y0}) reaches the edge");
        assert!(x1 <= 594 && y1 <= 594, "bbox ({x1},{y1}) reaches the edge");
    }

    #[test]
    fn rotation_changes_the_footprint() {
        let img = base_image(400, 400);
        let flat = WatermarkOptions {
            opacity: 255,
            angle_degrees: 0.0,
            ..WatermarkOptions::default()
        };
        let tilted = WatermarkOptions {
            opacity: 255,
            angle_degrees: 30.0,
            ..WatermarkOptions::default()
        };
        let out_flat = apply_watermark(&img, &flat);
        let out_tilted = apply_watermark(&img, &tilted);

        let (_, fy0, _, fy1) = changed_bbox(&img, &out_flat).unwrap();
        let (_, ty0, _, ty1) = changed_bbox(&img, &out_tilted).unwrap();
        assert!(
            ty1 - ty0 > fy1 - fy0,
            "rotated text should span more rows ({} vs {})",
            ty1 - ty0,
            fy1 - fy0
        );
    }

    #[test]
    fn empty_text_falls_back_to_default() {
        let img = base_image(400, 300);
        let opts = WatermarkOptions {
            text: String::new(),
            opacity: 255,
            angle_degrees: 0.0,
            ..WatermarkOptions::default()
        };
        let out = apply_watermark(&img, &opts);
        assert!(changed_bbox(&img, &out).is_some());
    }

    #[test]
    fn missing_font_path_falls_back_without_failing() {
        let img = base_image(300, 300);
        let opts = WatermarkOptions {
            opacity: 255,
            angle_degrees: 0.0,
            font_path: Some(PathBuf::from("/nonexistent/no-such-font.ttf")),
            ..WatermarkOptions::default()
        };
        let out = apply_watermark(&img, &opts);
        assert!(changed_bbox(&img, &out).is_some());
    }

    #[test]
    fn corner_names_parse_with_fallback() {
        assert_eq!(Corner::from_name("top-left"), Corner::TopLeft);
        assert_eq!(Corner::from_name("top-right"), Corner::TopRight);
        assert_eq!(Corner::from_name("bottom-left"), Corner::BottomLeft);
        assert_eq!(Corner::from_name("bottom-right"), Corner::BottomRight);
        assert_eq!(Corner::from_name("center"), Corner::BottomRight);
        assert_eq!(Corner::from_name(""), Corner::BottomRight);
    }

    #[test]
    fn bitmap_layer_respects_requested_opacity() {
        let layer = render_bitmap("A", 16, 120);
        assert_eq!(layer.height(), 16);
        let set = layer.pixels().filter(|p| p[3] > 0).count();
        assert!(set > 0, "glyph rendered no pixels");
        for px in layer.pixels() {
            assert!(px[3] == 0 || px[3] == 120);
        }
    }

    #[test]
    fn corner_position_clamps_oversized_boxes() {
        // Box wider than the image: clamp to x = 0 rather than going negative.
        let (x, y) = corner_position(Corner::BottomRight, 100, 100, 150, 30);
        assert_eq!(x, 0);
        assert_eq!(y, 50);

        let (x, y) = corner_position(Corner::TopLeft, 100, 100, 90, 90);
        assert_eq!((x, y), (10, 10));
    }
}
