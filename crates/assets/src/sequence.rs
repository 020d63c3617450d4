//! The ordered environment-then-model load
//!
//! Stage one fetches and bakes the environment, stage two fetches the model.
//! Stage two only runs when stage one succeeded, and each result is emitted
//! before the next stage starts, so a consumer that applies events in order
//! never sees a model before its environment.

use std::thread::{self, JoinHandle};

use scene::{BakeSettings, EnvironmentBaker, EnvironmentMap, Model};

use crate::error::LoadError;
use crate::progress::LoadProgress;
use crate::source::AssetSource;

/// Result of one stage, delivered to the event loop
#[derive(Debug)]
pub enum LoadEvent {
    EnvironmentReady(EnvironmentMap),
    ModelReady(Model),
    Failed(LoadError),
}

/// Whether `progress` reached a new whole percent since `last_step`.
///
/// Progress without a known total has no percent and is always reported.
fn should_log(last_step: &mut Option<u64>, progress: LoadProgress) -> bool {
    let step = progress.whole_percent();
    if step.is_some() && step == *last_step {
        return false;
    }
    *last_step = step;
    true
}

/// Progress callback that logs once per whole percent
fn progress_logger(stage: &'static str, prominent: bool) -> impl FnMut(LoadProgress) {
    let mut last_step = None;
    move |progress: LoadProgress| {
        if !should_log(&mut last_step, progress) {
            return;
        }
        match progress.fraction() {
            Some(fraction) if prominent => tracing::info!("{}% loaded", fraction * 100.0),
            Some(fraction) => tracing::debug!("{stage}: {:.0}% loaded", fraction * 100.0),
            None => tracing::debug!("{stage}: {} bytes loaded", progress.loaded),
        }
    }
}

/// Fetch the panorama and bake it into an environment map.
///
/// # Errors
///
/// Returns [`LoadError::EnvironmentLoadFailed`] when the panorama cannot be
/// fetched or decoded.
pub fn load_environment<S: AssetSource + ?Sized>(
    source: &S,
    bake: BakeSettings,
) -> Result<EnvironmentMap, LoadError> {
    let url = source.environment_location();
    tracing::info!("Loading environment from {url}");
    let image = source
        .fetch_environment(&mut progress_logger("environment", false))
        .map_err(|source| LoadError::EnvironmentLoadFailed {
            url: url.clone(),
            source,
        })?;
    Ok(EnvironmentBaker::new(bake).bake(image))
}

/// Fetch and import the model.
///
/// # Errors
///
/// Returns [`LoadError::ModelLoadFailed`] when the model cannot be read or
/// imported.
pub fn load_model<S: AssetSource + ?Sized>(source: &S) -> Result<Model, LoadError> {
    let path = source.model_location();
    tracing::info!("Loading model from {}", path.display());
    let model = source
        .fetch_model(&mut progress_logger("model", true))
        .map_err(|source| LoadError::ModelLoadFailed {
            path: path.clone(),
            source,
        })?;
    tracing::info!("Model loaded successfully");
    Ok(model)
}

/// Run both stages in order, handing every outcome to `emit`.
///
/// A failure is logged and emitted as [`LoadEvent::Failed`]; it never panics
/// and never retries.
pub fn run_load_sequence<S, F>(source: &S, bake: BakeSettings, mut emit: F)
where
    S: AssetSource + ?Sized,
    F: FnMut(LoadEvent),
{
    let outcome = load_environment(source, bake)
        .and_then(|environment| {
            emit(LoadEvent::EnvironmentReady(environment));
            load_model(source)
        })
        .map(|model| emit(LoadEvent::ModelReady(model)));

    if let Err(error) = outcome {
        tracing::error!("{error}");
        emit(LoadEvent::Failed(error));
    }
}

/// Run [`run_load_sequence`] on a named background thread.
///
/// # Errors
///
/// Returns the I/O error from [`thread::Builder::spawn`] when the thread
/// cannot be created.
pub fn spawn_loader<S, F>(source: S, bake: BakeSettings, emit: F) -> std::io::Result<JoinHandle<()>>
where
    S: AssetSource + Send + 'static,
    F: FnMut(LoadEvent) + Send + 'static,
{
    thread::Builder::new()
        .name("asset-loader".into())
        .spawn(move || run_load_sequence(&source, bake, emit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(loaded: u64) -> LoadProgress {
        LoadProgress {
            loaded,
            total: Some(1000),
        }
    }

    #[test]
    fn events_within_one_percent_log_once() {
        let mut last = None;
        let logged: Vec<u64> = [1, 5, 9, 10, 15, 19, 20, 1000]
            .into_iter()
            .filter(|&loaded| should_log(&mut last, known(loaded)))
            .collect();
        assert_eq!(logged, vec![1, 10, 20, 1000]);
        assert_eq!(last, Some(100));
    }

    #[test]
    fn first_event_is_always_logged() {
        let mut last = None;
        assert!(should_log(&mut last, known(0)));
        assert_eq!(last, Some(0));
        assert!(!should_log(&mut last, known(9)));
    }

    #[test]
    fn unknown_total_is_always_logged() {
        let mut last = None;
        for loaded in [10, 10, 20] {
            assert!(should_log(&mut last, LoadProgress { loaded, total: None }));
        }
        assert_eq!(last, None);
    }

    #[test]
    fn unknown_total_between_known_steps_is_reported() {
        let mut last = None;
        assert!(should_log(&mut last, known(500)));
        assert!(should_log(&mut last, LoadProgress { loaded: 501, total: None }));
        assert!(should_log(&mut last, known(505)));
        assert!(!should_log(&mut last, known(509)));
    }
}
