//! Error types for the imageshield crate.

/// Errors that can occur while applying privacy filters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// An obfuscation intensity of zero was requested.
    ///
    /// Zero is meaningless for every mode (no blocks, no kernel, no noise),
    /// so it is rejected rather than clamped. Oversized pixelation
    /// intensities are clamped instead, since a safe value exists there.
    #[error("intensity must be at least 1, got {0}")]
    InvalidIntensity(u32),

    /// No face detector is configured on the engine.
    #[error("face redaction requires a detector; none is configured")]
    NoDetector,

    /// The face detection model could not be loaded.
    #[error("failed to load face detection model: {0}")]
    ModelLoad(String),

    /// The output format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
