//! # Viewer
//!
//! Opens a window showing a glTF model lit by an HDR panorama. The panorama
//! is fetched and baked first, the model second; until each arrives the
//! window keeps rendering whatever is already in the scene. Dragging orbits
//! the camera, the wheel zooms, and the pointer position tilts the model.

mod app;
mod input;

use std::path::PathBuf;

use anyhow::Result;
use assets::source::{DEFAULT_HDR_URL, DEFAULT_MODEL_PATH};
use assets::AssetLocations;
use clap::Parser;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Equirectangular HDR panorama, an http(s) URL or a local path
    #[arg(long, default_value = DEFAULT_HDR_URL)]
    hdr_url: String,

    /// glTF model to display
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    app::run(AssetLocations {
        hdr_url: args.hdr_url,
        model_path: args.model,
    })
}
