//! Whole-image obfuscation: pixelation, blur, or additive noise.

use image::imageops::FilterType;
use image::RgbImage;
use imageproc::filter::gaussian_blur_f32;
use rand::Rng;

use crate::error::{Error, Result};

/// Which obfuscation transform to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObfuscationMode {
    /// Downscale then upscale with nearest-neighbor, producing visible blocks.
    #[default]
    Pixelate,
    /// Gaussian blur with a kernel size derived from the intensity.
    Blur,
    /// Additive per-channel uniform noise, saturating at channel maximum.
    Noise,
}

impl ObfuscationMode {
    /// Resolve a mode from its lowercase name.
    ///
    /// Returns `None` for unrecognized names; the caller decides the
    /// fallback (the engine passes the image through unchanged).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pixelate" => Some(Self::Pixelate),
            "blur" => Some(Self::Blur),
            "noise" => Some(Self::Noise),
            _ => None,
        }
    }

    /// The canonical lowercase name of this mode.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pixelate => "pixelate",
            Self::Blur => "blur",
            Self::Noise => "noise",
        }
    }
}

impl std::fmt::Display for ObfuscationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply `mode` at the given strength to the whole image.
///
/// `intensity` controls block size (pixelate), kernel size (blur), or noise
/// amplitude. Pixelation intensities larger than the shorter image dimension
/// are clamped so neither dimension collapses below one pixel.
///
/// # Errors
///
/// Returns [`Error::InvalidIntensity`] if `intensity` is zero.
pub fn obfuscate(image: &RgbImage, mode: ObfuscationMode, intensity: u32) -> Result<RgbImage> {
    if intensity == 0 {
        return Err(Error::InvalidIntensity(intensity));
    }

    match mode {
        ObfuscationMode::Pixelate => Ok(pixelate(image, intensity)),
        ObfuscationMode::Blur => Ok(blur(image, intensity)),
        ObfuscationMode::Noise => Ok(noise(image, intensity)),
    }
}

/// Apply an obfuscation mode named by an untrusted string.
///
/// Returns the transformed image and the resolved mode name. Unknown names
/// pass the image through unchanged and echo the caller's name back;
/// intensity is not validated in that case, since no transform runs.
///
/// # Errors
///
/// Returns [`Error::InvalidIntensity`] if the name resolves to a mode and
/// `intensity` is zero.
pub fn obfuscate_named(
    image: &RgbImage,
    mode_name: &str,
    intensity: u32,
) -> Result<(RgbImage, String)> {
    match ObfuscationMode::from_name(mode_name) {
        Some(mode) => Ok((obfuscate(image, mode, intensity)?, mode.name().to_string())),
        None => Ok((image.clone(), mode_name.to_string())),
    }
}

/// Downscale by `intensity` with linear interpolation, then upscale back
/// with nearest-neighbor. Intensity 1 is an exact identity.
fn pixelate(image: &RgbImage, intensity: u32) -> RgbImage {
    let (w, h) = (image.width(), image.height());
    let factor = intensity.min(w.min(h));
    if factor <= 1 {
        return image.clone();
    }

    let small = image::imageops::resize(image, w / factor, h / factor, FilterType::Triangle);
    image::imageops::resize(&small, w, h, FilterType::Nearest)
}

/// Gaussian blur with kernel size `intensity`, rounded up to the next odd
/// value, and sigma derived from the kernel size.
fn blur(image: &RgbImage, intensity: u32) -> RgbImage {
    let kernel = if intensity % 2 == 0 {
        intensity + 1
    } else {
        intensity
    };
    // The usual kernel-to-sigma relation for an "automatic" sigma.
    let sigma = 0.3 * ((kernel - 1) as f32 * 0.5 - 1.0) + 0.8;
    gaussian_blur_f32(image, sigma.max(0.1))
}

/// Add uniform noise in `[0, intensity)` to every channel, saturating at 255.
fn noise(image: &RgbImage, intensity: u32) -> RgbImage {
    let mut rng = rand::thread_rng();
    let mut output = image.clone();

    for pixel in output.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let delta = rng.gen_range(0..intensity).min(255) as u8;
            *channel = channel.saturating_add(delta);
        }
    }

    output
}
