use std::path::PathBuf;

use thiserror::Error;

/// Why a single asset could not be produced
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid HDR image: {0}")]
    Hdr(#[from] image::ImageError),
    #[error(transparent)]
    ImageSize(#[from] scene::environment::ImageSizeError),
    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("model contains no triangle primitives")]
    EmptyModel,
}

/// The two ways the load sequence can stop. Neither is fatal to the viewer.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("An error happened while loading the HDRI from {url}: {source}")]
    EnvironmentLoadFailed {
        url: String,
        #[source]
        source: AssetError,
    },
    #[error("An error happened while loading the model from {}: {source}", path.display())]
    ModelLoadFailed {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
}
