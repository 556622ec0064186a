//! Filter dispatch, file processing, and metadata-stripping persistence.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageEncoder, ImageFormat, RgbImage};

use crate::error::{Error, Result};
use crate::metadata::{strip_jpeg_metadata, strip_png_metadata};
use crate::obfuscate::{obfuscate, ObfuscationMode};
use crate::redact::{redact_faces, FaceDetector};
use crate::watermark::{apply_watermark, WatermarkOptions, DEFAULT_TEXT};

/// File name of the well-known output image.
pub const DEFAULT_OUTPUT_NAME: &str = "processed.jpg";

/// One filter invocation, resolved from user input at the caller boundary.
///
/// Callers translate module-name strings (GUI selectors, CLI subcommands)
/// into this enum exactly once; the library never re-parses names.
#[derive(Debug, Clone)]
pub enum FilterRequest {
    /// Blur every detected face.
    Redact,
    /// Composite a semi-transparent text watermark.
    Watermark(WatermarkOptions),
    /// Obfuscate the whole image with the given mode and strength.
    Obfuscate {
        /// Which transform to apply.
        mode: ObfuscationMode,
        /// Transform strength (block size, kernel size, or noise amplitude).
        intensity: u32,
    },
}

impl FilterRequest {
    /// The audit-log module label for this request.
    #[must_use]
    pub fn module(&self) -> &'static str {
        match self {
            Self::Redact => "redact",
            Self::Watermark(_) => "watermark",
            Self::Obfuscate { .. } => "obfuscate",
        }
    }
}

/// Result of applying one filter in memory.
#[derive(Debug)]
pub struct FilterOutput {
    /// The filtered image.
    pub image: RgbImage,
    /// Number of faces found, for redaction requests.
    pub faces_found: Option<usize>,
    /// One-line parameter summary for the audit trail.
    pub summary: String,
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the source file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Number of faces found, for redaction requests.
    pub faces_found: Option<usize>,
    /// Parameter summary on success, error description on failure.
    pub message: String,
}

/// The filter engine holding the configured face detector.
///
/// Create once and reuse for multiple images. Watermarking and obfuscation
/// work without a detector; face redaction requires one.
#[derive(Default)]
pub struct ShieldEngine {
    detector: Option<Box<dyn FaceDetector>>,
}

impl ShieldEngine {
    /// Create an engine without a face detector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given face detection backend.
    #[must_use]
    pub fn with_detector(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// Create an engine with the built-in SeetaFace detector, loading the
    /// model from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::ModelLoad`] if the model cannot
    /// be read.
    #[cfg(feature = "seeta")]
    pub fn with_seeta_model(path: &Path) -> Result<Self> {
        let detector = crate::redact::SeetaDetector::from_model_path(path)?;
        Ok(Self::with_detector(Box::new(detector)))
    }

    /// Apply one filter to an in-memory image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDetector`] for a redaction request on an engine
    /// without a detector, and [`Error::InvalidIntensity`] for a zero
    /// obfuscation intensity.
    pub fn apply(&self, image: &RgbImage, request: &FilterRequest) -> Result<FilterOutput> {
        match request {
            FilterRequest::Redact => {
                let detector = self.detector.as_deref().ok_or(Error::NoDetector)?;
                let (image, count) = redact_faces(image, detector);
                Ok(FilterOutput {
                    image,
                    faces_found: Some(count),
                    summary: format!("faces blurred: {count}"),
                })
            }
            FilterRequest::Watermark(opts) => {
                let text = if opts.text.is_empty() {
                    DEFAULT_TEXT
                } else {
                    opts.text.as_str()
                };
                let summary = format!(
                    "text='{text}' opacity={} angle={}° position={}",
                    opts.opacity, opts.angle_degrees, opts.corner
                );
                Ok(FilterOutput {
                    image: apply_watermark(image, opts),
                    faces_found: None,
                    summary,
                })
            }
            FilterRequest::Obfuscate { mode, intensity } => Ok(FilterOutput {
                image: obfuscate(image, *mode, *intensity)?,
                faces_found: None,
                summary: format!("mode={mode} intensity={intensity}"),
            }),
        }
    }

    /// Process a single image file: load, filter, save with metadata
    /// stripping. Parent directories of `output` are created on demand.
    ///
    /// Never panics; failures are reported through the returned
    /// [`ProcessResult`].
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        request: &FilterRequest,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            faces_found: None,
            message: String::new(),
        };

        let image = match load_image(input) {
            Ok(img) => img,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let outcome = match self.apply(&image, request) {
            Ok(o) => o,
            Err(e) => {
                result.message = format!("Failed to apply filter: {e}");
                return result;
            }
        };
        result.faces_found = outcome.faces_found;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match save_stripped(&outcome.image, output) {
            Ok(()) => {
                result.success = true;
                result.message = outcome.summary;
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }
}

/// Load an image file into an RGB buffer.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Decode`]
/// if its contents are not a decodable image.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let bytes = std::fs::read(path)?;
    let image = image::load_from_memory(&bytes).map_err(Error::Decode)?;
    Ok(image.to_rgb8())
}

/// Encode an image and write it with all metadata stripped.
///
/// JPEG output is encoded at maximum quality and run through the JPEG
/// metadata stripper; PNG output through the PNG stripper. The persisted
/// file carries no information beyond pixel data.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for extensions other than
/// jpg/jpeg/png, and [`Error::Io`] if the file cannot be written.
pub fn save_stripped(image: &RgbImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let mut buffer = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(image.clone()))?;
            buffer = strip_jpeg_metadata(&buffer);
        }
        ImageFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
            encoder.write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )?;
            buffer = strip_png_metadata(&buffer);
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    std::fs::write(path, &buffer)?;
    Ok(())
}

/// The well-known output location inside `dir`: a single fixed-name file,
/// overwritten on every invocation.
#[must_use]
pub fn default_output_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_OUTPUT_NAME)
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}
