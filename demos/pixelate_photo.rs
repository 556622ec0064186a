//! Pixelate a photo from the command line.
//!
//! Usage:
//! ```sh
//! cargo run --example pixelate_photo -- input.jpg output.jpg
//! ```

use std::env;
use std::process;

use imageshield::{FilterRequest, ObfuscationMode, ShieldEngine};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output>", args[0]);
        process::exit(1);
    }

    let engine = ShieldEngine::new();
    let request = FilterRequest::Obfuscate {
        mode: ObfuscationMode::Pixelate,
        intensity: 10,
    };
    let result = engine.process_file(args[1].as_ref(), args[2].as_ref(), &request);

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
