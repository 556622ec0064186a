//! Privacy-oriented image filters: face redaction, text watermarking with
//! metadata stripping, and whole-image obfuscation.
//!
//! Every filter takes an in-memory RGB image and returns a new one;
//! persistence is a separate, explicit step that strips all embedded
//! metadata (EXIF, XMP, comments) from the saved file.
//!
//! # Quick Start
//!
//! ```no_run
//! use imageshield::{FilterRequest, ObfuscationMode, ShieldEngine};
//!
//! let engine = ShieldEngine::new();
//! let img = imageshield::load_image("photo.jpg".as_ref()).unwrap();
//! let out = engine
//!     .apply(&img, &FilterRequest::Obfuscate {
//!         mode: ObfuscationMode::Pixelate,
//!         intensity: 10,
//!     })
//!     .unwrap();
//! imageshield::save_stripped(&out.image, "assets/processed.jpg".as_ref()).unwrap();
//! ```
//!
//! # Face Redaction
//!
//! Detection is pluggable through the [`FaceDetector`] trait. The `seeta`
//! feature (default) provides a detector backed by the SeetaFace engine;
//! it loads its model from a caller-supplied path:
//!
//! ```no_run
//! use imageshield::{FilterRequest, ShieldEngine};
//!
//! let engine = ShieldEngine::with_seeta_model("seeta_fd_frontal_v1.0.bin".as_ref()).unwrap();
//! let img = imageshield::load_image("group.jpg".as_ref()).unwrap();
//! let out = engine.apply(&img, &FilterRequest::Redact).unwrap();
//! println!("{} face(s) blurred", out.faces_found.unwrap_or(0));
//! ```

#![deny(missing_docs)]

pub mod audit;
mod engine;
pub mod error;
mod metadata;
pub mod obfuscate;
pub mod redact;
pub mod watermark;

pub use audit::{AuditEntry, AuditLog};
pub use engine::{
    default_output_path, is_supported_image, load_image, save_stripped, FilterOutput,
    FilterRequest, ProcessResult, ShieldEngine, DEFAULT_OUTPUT_NAME,
};
pub use error::{Error, Result};
pub use metadata::{strip_jpeg_metadata, strip_png_metadata};
pub use obfuscate::{obfuscate, obfuscate_named, ObfuscationMode};
pub use redact::{redact_faces, FaceDetector, Region};
#[cfg(feature = "seeta")]
pub use redact::SeetaDetector;
pub use watermark::{apply_watermark, Corner, WatermarkOptions, DEFAULT_TEXT};
