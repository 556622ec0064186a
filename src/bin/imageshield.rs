use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use imageshield::{
    default_output_path, load_image, save_stripped, AuditEntry, FilterRequest, ObfuscationMode,
    ProcessResult, ShieldEngine, WatermarkOptions,
};

#[derive(Parser)]
#[command(
    name = "imageshield",
    about = "Privacy filters for images: blur faces, watermark, pixelate",
    version,
    after_help = "The result is written to assets/processed.jpg unless -o is given,\n\
                  overwriting any previous result. Saved files carry no EXIF or\n\
                  other embedded metadata."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output image file (default: assets/processed.jpg)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Append a one-line audit entry to this file
    #[arg(long, global = true)]
    audit_log: Option<PathBuf>,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Detect faces and blur each one
    Redact {
        /// Input image file
        input: PathBuf,

        /// SeetaFace frontal-face model file
        #[arg(long, default_value = "seeta_fd_frontal_v1.0.bin")]
        model: PathBuf,
    },

    /// Composite a semi-transparent text watermark
    Watermark {
        /// Input image file
        input: PathBuf,

        /// Watermark text
        #[arg(long, default_value = "SAFE SHARE")]
        text: String,

        /// Text opacity, 0-255
        #[arg(long, default_value_t = 120)]
        opacity: u8,

        /// Rotation in degrees, positive = counter-clockwise
        #[arg(long, default_value_t = 30.0)]
        angle: f32,

        /// Corner: top-left, top-right, bottom-left, bottom-right
        #[arg(long, default_value = "bottom-right")]
        position: String,

        /// TrueType font file (falls back to system fonts, then built-in)
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Pixelate, blur, or add noise across the whole image
    Obfuscate {
        /// Input image file
        input: PathBuf,

        /// Mode: pixelate, blur, or noise (unknown names pass through)
        #[arg(long, default_value = "pixelate")]
        mode: String,

        /// Transform strength
        #[arg(long, default_value_t = 10)]
        intensity: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(Path::new("assets")));

    let result = match &cli.command {
        Command::Redact { input, model } => run_redact(input, &output, model),
        Command::Watermark {
            input,
            text,
            opacity,
            angle,
            position,
            font,
        } => {
            let opts = WatermarkOptions {
                text: text.clone(),
                opacity: *opacity,
                angle_degrees: *angle,
                corner: imageshield::Corner::from_name(position),
                font_path: font.clone(),
            };
            ShieldEngine::new().process_file(input, &output, &FilterRequest::Watermark(opts))
        }
        Command::Obfuscate {
            input,
            mode,
            intensity,
        } => match ObfuscationMode::from_name(mode) {
            Some(resolved) => ShieldEngine::new().process_file(
                input,
                &output,
                &FilterRequest::Obfuscate {
                    mode: resolved,
                    intensity: *intensity,
                },
            ),
            None => run_passthrough(input, &output, mode, *intensity),
        },
    };

    print_result(&result, cli.quiet);

    if result.success {
        if let Some(log_path) = &cli.audit_log {
            let entry = AuditEntry::now(module_label(&cli.command), result.message.clone());
            if let Err(e) = append_audit(log_path, &entry) {
                eprintln!("[WARN] Failed to write audit log: {e}");
            }
        }
    }

    if !result.success {
        process::exit(1);
    }
}

fn module_label(command: &Command) -> &'static str {
    match command {
        Command::Redact { .. } => "redact",
        Command::Watermark { .. } => "watermark",
        Command::Obfuscate { .. } => "obfuscate",
    }
}

#[cfg(feature = "seeta")]
fn run_redact(input: &Path, output: &Path, model: &Path) -> ProcessResult {
    match ShieldEngine::with_seeta_model(model) {
        Ok(engine) => engine.process_file(input, output, &FilterRequest::Redact),
        Err(e) => ProcessResult {
            path: input.to_path_buf(),
            success: false,
            faces_found: None,
            message: format!("Failed to load model: {e}"),
        },
    }
}

#[cfg(not(feature = "seeta"))]
fn run_redact(input: &Path, _output: &Path, _model: &Path) -> ProcessResult {
    ProcessResult {
        path: input.to_path_buf(),
        success: false,
        faces_found: None,
        message: "This build has no face detector (rebuild with the `seeta` feature)".to_string(),
    }
}

/// Unknown obfuscation modes pass the image through unchanged, echoing the
/// caller's mode name in the summary.
fn run_passthrough(input: &Path, output: &Path, mode: &str, intensity: u32) -> ProcessResult {
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

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                result.message = format!("Failed to create output directory: {e}");
                return result;
            }
        }
    }

    match save_stripped(&image, output) {
        Ok(()) => {
            result.success = true;
            result.message = format!("mode={mode} intensity={intensity}");
        }
        Err(e) => {
            result.message = format!("Failed to save: {e}");
        }
    }

    result
}

fn append_audit(path: &Path, entry: &AuditEntry) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{entry}")
}

fn print_result(result: &ProcessResult, quiet: bool) {
    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        if !quiet {
            match result.faces_found {
                Some(n) => eprintln!("[OK] {filename}: {n} face(s) blurred"),
                None => eprintln!("[OK] {filename}: {}", result.message),
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }
}
