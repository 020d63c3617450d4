#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::must_use_candidate
)]
//! # Viewer Assets
//!
//! Fetching and decoding of the two assets the viewer shows, and the ordered
//! sequence that loads them.
//!
//! -   [`RemoteAssetSource`] downloads the HDR panorama over HTTP and reads the
//!     glTF model from disk, reporting byte progress as it goes.
//! -   [`run_load_sequence`] loads the environment, bakes it, and only then
//!     loads the model. Each stage result is handed to a caller-supplied sink
//!     as a [`LoadEvent`].
//! -   [`spawn_loader`] runs that sequence on a background thread so the event
//!     loop never blocks on I/O.

pub mod error;
pub mod gltf_loader;
pub mod hdr;
pub mod progress;
pub mod sequence;
pub mod source;

pub use error::{AssetError, LoadError};
pub use progress::LoadProgress;
pub use sequence::{load_environment, load_model, run_load_sequence, spawn_loader, LoadEvent};
pub use source::{AssetLocations, AssetSource, RemoteAssetSource};
