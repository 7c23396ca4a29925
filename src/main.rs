//! # Panorama Kit Entry Point
//!
//! Runs a headless capture session with the configuration named by
//! `PANORAMA_KIT_CONFIG` (or `panorama_kit.json`).
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    panorama_kit::run();
}
