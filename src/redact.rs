//! Face redaction: detect face regions and destructively blur each one.
//!
//! Detection runs on a grayscale copy of the *original* image, and every
//! region is blurred from the *original* color pixels, so overlapping
//! regions never read each other's blurred output.

use image::RgbImage;
use imageproc::filter::gaussian_blur_f32;

/// Blur strength applied to detected face regions.
///
/// Sigma 30 is the large-kernel regime (a 99x99 kernel at the usual
/// 3-sigma truncation), strong enough that facial features are not
/// recognizable at any common image size.
const REDACTION_SIGMA: f32 = 30.0;

/// Axis-aligned bounding box of one detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X coordinate of the top-left corner (pixels).
    pub x: u32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: u32,
    /// Width of the bounding box (pixels).
    pub width: u32,
    /// Height of the bounding box (pixels).
    pub height: u32,
}

impl Region {
    /// Clip the region to an image of the given dimensions.
    ///
    /// Returns `None` if nothing remains inside the image.
    #[must_use]
    pub fn clipped_to(&self, img_w: u32, img_h: u32) -> Option<Region> {
        if self.x >= img_w || self.y >= img_h {
            return None;
        }
        let width = self.width.min(img_w - self.x);
        let height = self.height.min(img_h - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Region {
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom detector (ONNX, dlib, etc.)
/// and pass it to [`crate::ShieldEngine::with_detector`]. The built-in
/// [`SeetaDetector`] is available behind the `seeta` feature.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` x `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Region>;
}

/// Blur every detected face region of `image`.
///
/// Returns the redacted image and the number of regions found. With zero
/// detections the returned image is pixel-identical to the input.
#[must_use]
pub fn redact_faces(image: &RgbImage, detector: &dyn FaceDetector) -> (RgbImage, usize) {
    let gray = image::imageops::grayscale(image);
    let faces = detector.detect(gray.as_raw(), gray.width(), gray.height());

    let mut output = image.clone();
    let mut count = 0;

    for region in &faces {
        let Some(r) = region.clipped_to(image.width(), image.height()) else {
            continue;
        };
        count += 1;

        // Blur the crop of the original image, not the partially redacted output.
        let crop = image::imageops::crop_imm(image, r.x, r.y, r.width, r.height).to_image();
        let blurred = gaussian_blur_f32(&crop, REDACTION_SIGMA);

        for dy in 0..r.height {
            for dx in 0..r.width {
                output.put_pixel(r.x + dx, r.y + dy, *blurred.get_pixel(dx, dy));
            }
        }
    }

    (output, count)
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The SeetaFace model binary is loaded from a caller-supplied path at
/// construction. Detection tuning (minimum face size, score threshold,
/// pyramid scale, window step) is fixed here and not exposed to callers.
#[cfg(feature = "seeta")]
pub struct SeetaDetector {
    model: rustface::Model,
}

#[cfg(feature = "seeta")]
impl SeetaDetector {
    /// Load a SeetaFace frontal-face model from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read and
    /// [`crate::Error::ModelLoad`] if its contents are not a valid model.
    pub fn from_model_path(path: &std::path::Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)?;
        let model = rustface::read_model(std::io::Cursor::new(bytes))
            .map_err(|e| crate::Error::ModelLoad(e.to_string()))?;
        Ok(Self { model })
    }
}

#[cfg(feature = "seeta")]
impl FaceDetector for SeetaDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Region> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                // SeetaFace can report boxes that start above or left of the
                // image; clamp the origin and shrink the box accordingly.
                let x = bbox.x().max(0) as u32;
                let y = bbox.y().max(0) as u32;
                let lost_x = (x as i32 - bbox.x()) as u32;
                let lost_y = (y as i32 - bbox.y()) as u32;
                Region {
                    x,
                    y,
                    width: bbox.width().saturating_sub(lost_x),
                    height: bbox.height().saturating_sub(lost_y),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Detector returning a fixed set of regions, for tests without a model.
    struct FixedDetector(Vec<Region>);

    impl FaceDetector for FixedDetector {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<Region> {
            self.0.clone()
        }
    }

    fn gradient_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    /// High-contrast checkerboard: blurring any region moves every pixel
    /// toward mid-gray, so "did this pixel change" assertions are robust.
    fn checkerboard(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn zero_faces_returns_identical_image() {
        let img = gradient_image(64, 48);
        let detector = FixedDetector(Vec::new());
        let (out, count) = redact_faces(&img, &detector);
        assert_eq!(count, 0);
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn count_matches_detected_regions() {
        let img = checkerboard(100, 100);
        let detector = FixedDetector(vec![
            Region {
                x: 10,
                y: 10,
                width: 20,
                height: 20,
            },
            Region {
                x: 60,
                y: 60,
                width: 20,
                height: 20,
            },
        ]);
        let (out, count) = redact_faces(&img, &detector);
        assert_eq!(count, 2);

        // Pixels inside a region change, pixels outside do not.
        assert_ne!(out.get_pixel(20, 20), img.get_pixel(20, 20));
        assert_eq!(out.get_pixel(45, 45), img.get_pixel(45, 45));
        assert_eq!(out.get_pixel(0, 99), img.get_pixel(0, 99));
    }

    #[test]
    fn overlapping_regions_blur_from_original_pixels() {
        let img = gradient_image(80, 80);
        let a = Region {
            x: 10,
            y: 10,
            width: 40,
            height: 40,
        };
        let b = Region {
            x: 30,
            y: 30,
            width: 40,
            height: 40,
        };

        let (out_ab, _) = redact_faces(&img, &FixedDetector(vec![a, b]));
        let (out_ba, _) = redact_faces(&img, &FixedDetector(vec![b, a]));

        // Order independence: each region blurs the original content, so the
        // non-overlapping parts match regardless of processing order.
        assert_eq!(out_ab.get_pixel(15, 15), out_ba.get_pixel(15, 15));
        assert_eq!(out_ab.get_pixel(65, 65), out_ba.get_pixel(65, 65));
    }

    #[test]
    fn out_of_bounds_region_is_clipped() {
        let img = gradient_image(50, 50);
        let detector = FixedDetector(vec![Region {
            x: 40,
            y: 40,
            width: 30,
            height: 30,
        }]);
        let (out, count) = redact_faces(&img, &detector);
        assert_eq!(count, 1);
        assert_eq!(out.width(), 50);
        assert_eq!(out.height(), 50);
    }

    #[test]
    fn fully_outside_region_is_dropped() {
        let img = gradient_image(50, 50);
        let detector = FixedDetector(vec![Region {
            x: 60,
            y: 60,
            width: 10,
            height: 10,
        }]);
        let (out, count) = redact_faces(&img, &detector);
        assert_eq!(count, 0);
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn region_clipping() {
        let r = Region {
            x: 5,
            y: 5,
            width: 10,
            height: 10,
        };
        assert_eq!(r.clipped_to(100, 100), Some(r));
        assert_eq!(
            r.clipped_to(8, 8),
            Some(Region {
                x: 5,
                y: 5,
                width: 3,
                height: 3,
            })
        );
        assert_eq!(r.clipped_to(5, 5), None);
    }
}
