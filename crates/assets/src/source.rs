//! Where asset bytes come from

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scene::{HdrImage, Model};

use crate::error::AssetError;
use crate::gltf_loader::load_model_from_bytes;
use crate::hdr::decode_hdr;
use crate::progress::{read_with_progress, LoadProgress};

pub const DEFAULT_HDR_URL: &str =
    "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/4k/satara_night_4k.hdr";
pub const DEFAULT_MODEL_PATH: &str = "./DamagedHelmet.gltf";

// 4k panoramas run to tens of megabytes.
const FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Location of the environment panorama and the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocations {
    /// `http(s)://` URL, or a local file path
    pub hdr_url: String,
    pub model_path: PathBuf,
}

impl Default for AssetLocations {
    fn default() -> Self {
        Self {
            hdr_url: DEFAULT_HDR_URL.to_owned(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

/// Produces decoded assets. Implementations block; callers run them off the
/// event loop thread.
pub trait AssetSource {
    fn environment_location(&self) -> String;

    fn model_location(&self) -> PathBuf;

    /// # Errors
    ///
    /// Fails when the panorama cannot be downloaded or decoded.
    fn fetch_environment(
        &self,
        on_progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<HdrImage, AssetError>;

    /// # Errors
    ///
    /// Fails when the model file cannot be read or imported.
    fn fetch_model(&self, on_progress: &mut dyn FnMut(LoadProgress)) -> Result<Model, AssetError>;
}

/// HTTP for the panorama, the filesystem for the model
pub struct RemoteAssetSource {
    locations: AssetLocations,
    client: reqwest::blocking::Client,
}

impl RemoteAssetSource {
    /// # Errors
    ///
    /// Returns [`AssetError::Http`] when the HTTP client cannot be built.
    pub fn new(locations: AssetLocations) -> Result<Self, AssetError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("helmet-viewer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { locations, client })
    }

    fn download(
        &self,
        url: &str,
        on_progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<Vec<u8>, AssetError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let total = response.content_length();
        Ok(read_with_progress(response, total, on_progress)?)
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn read_file(path: &Path, on_progress: &mut dyn FnMut(LoadProgress)) -> Result<Vec<u8>, AssetError> {
    let file = File::open(path)?;
    let total = file.metadata().ok().map(|m| m.len());
    Ok(read_with_progress(file, total, on_progress)?)
}

impl AssetSource for RemoteAssetSource {
    fn environment_location(&self) -> String {
        self.locations.hdr_url.clone()
    }

    fn model_location(&self) -> PathBuf {
        self.locations.model_path.clone()
    }

    fn fetch_environment(
        &self,
        on_progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<HdrImage, AssetError> {
        let location = &self.locations.hdr_url;
        let bytes = if is_remote(location) {
            self.download(location, on_progress)?
        } else {
            read_file(Path::new(location), on_progress)?
        };
        decode_hdr(&bytes)
    }

    fn fetch_model(&self, on_progress: &mut dyn FnMut(LoadProgress)) -> Result<Model, AssetError> {
        let path = &self.locations.model_path;
        let bytes = read_file(path, on_progress)?;
        load_model_from_bytes(&bytes, path.parent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_helmet_scene() {
        let locations = AssetLocations::default();
        assert!(is_remote(&locations.hdr_url));
        assert!(locations.hdr_url.ends_with("satara_night_4k.hdr"));
        assert_eq!(locations.model_path, PathBuf::from("./DamagedHelmet.gltf"));
    }

    #[test]
    fn missing_model_file_is_an_io_error() {
        let source = RemoteAssetSource::new(AssetLocations {
            hdr_url: "does-not-exist.hdr".into(),
            model_path: PathBuf::from("does-not-exist.gltf"),
        })
        .unwrap();
        assert!(matches!(source.fetch_model(&mut |_| {}), Err(AssetError::Io(_))));
        assert!(matches!(source.fetch_environment(&mut |_| {}), Err(AssetError::Io(_))));
    }
}
