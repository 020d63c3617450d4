use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use assets::{
    run_load_sequence, spawn_loader, AssetError, AssetSource, LoadError, LoadEvent, LoadProgress,
};
use glam::Mat4;
use scene::{
    BakeSettings, HdrImage, LoadPhase, MeshPrimitive, Model, Vertex, ViewerSession, ViewerSettings,
};

#[derive(Clone, Copy)]
enum Outcome {
    Succeed,
    Fail,
}

/// In-memory source that records how often each stage was fetched
#[derive(Clone)]
struct ScriptedSource {
    environment: Outcome,
    model: Outcome,
    environment_fetches: Arc<AtomicUsize>,
    model_fetches: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(environment: Outcome, model: Outcome) -> Self {
        Self {
            environment,
            model,
            environment_fetches: Arc::new(AtomicUsize::new(0)),
            model_fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

fn not_found() -> AssetError {
    AssetError::Io(io::Error::new(io::ErrorKind::NotFound, "scripted failure"))
}

impl AssetSource for ScriptedSource {
    fn environment_location(&self) -> String {
        "memory://sky.hdr".into()
    }

    fn model_location(&self) -> PathBuf {
        PathBuf::from("memory/model.gltf")
    }

    fn fetch_environment(
        &self,
        on_progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<HdrImage, AssetError> {
        self.environment_fetches.fetch_add(1, Ordering::SeqCst);
        on_progress(LoadProgress { loaded: 48, total: Some(96) });
        on_progress(LoadProgress { loaded: 96, total: Some(96) });
        match self.environment {
            Outcome::Succeed => Ok(HdrImage::new(8, 4, vec![0.25; 96]).unwrap()),
            Outcome::Fail => Err(not_found()),
        }
    }

    fn fetch_model(&self, on_progress: &mut dyn FnMut(LoadProgress)) -> Result<Model, AssetError> {
        self.model_fetches.fetch_add(1, Ordering::SeqCst);
        on_progress(LoadProgress { loaded: 10, total: None });
        match self.model {
            Outcome::Succeed => Ok(triangle_model()),
            Outcome::Fail => Err(AssetError::EmptyModel),
        }
    }
}

fn triangle_model() -> Model {
    let v = |x: f32, y: f32| Vertex {
        position: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [x, y],
    };
    Model::new(
        None,
        vec![MeshPrimitive {
            vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)],
            indices: vec![0, 1, 2],
            transform: Mat4::IDENTITY,
            material: 0,
        }],
        Vec::new(),
        Vec::new(),
    )
}

fn small_bake() -> BakeSettings {
    BakeSettings {
        reflection_width: 8,
        irradiance_width: 4,
    }
}

fn collect(source: &ScriptedSource) -> Vec<LoadEvent> {
    let mut events = Vec::new();
    run_load_sequence(source, small_bake(), |event| events.push(event));
    events
}

fn apply(session: &mut ViewerSession, event: LoadEvent) {
    match event {
        LoadEvent::EnvironmentReady(environment) => session.set_environment(environment),
        LoadEvent::ModelReady(model) => {
            session.attach_model(model).unwrap();
        }
        LoadEvent::Failed(_) => {}
    }
}

#[test]
fn success_emits_environment_then_model() {
    let source = ScriptedSource::new(Outcome::Succeed, Outcome::Succeed);
    let events = collect(&source);

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], LoadEvent::EnvironmentReady(_)));
    assert!(matches!(events[1], LoadEvent::ModelReady(_)));

    let mut session = ViewerSession::new(ViewerSettings::default(), 640.0, 480.0, 1.0);
    for event in events {
        apply(&mut session, event);
    }
    assert_eq!(session.phase(), LoadPhase::ModelAttached);
    assert!(session.tick().model_matrix.is_some());
}

#[test]
fn environment_failure_never_starts_the_model() {
    let source = ScriptedSource::new(Outcome::Fail, Outcome::Succeed);
    let events = collect(&source);

    assert_eq!(source.environment_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(source.model_fetches.load(Ordering::SeqCst), 0);
    assert_eq!(events.len(), 1);
    match &events[0] {
        LoadEvent::Failed(LoadError::EnvironmentLoadFailed { url, source }) => {
            assert_eq!(url, "memory://sky.hdr");
            assert!(matches!(source, AssetError::Io(_)));
        }
        other => panic!("unexpected event {other:?}"),
    }

    let mut session = ViewerSession::new(ViewerSettings::default(), 640.0, 480.0, 1.0);
    for event in events {
        apply(&mut session, event);
    }
    for _ in 0..3 {
        let frame = session.tick();
        assert!(!frame.has_environment);
        assert!(frame.model_matrix.is_none());
    }
    assert_eq!(session.frames_rendered(), 3);
}

#[test]
fn model_failure_keeps_the_environment() {
    let source = ScriptedSource::new(Outcome::Succeed, Outcome::Fail);
    let events = collect(&source);

    assert_eq!(source.model_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], LoadEvent::EnvironmentReady(_)));
    assert!(matches!(
        events[1],
        LoadEvent::Failed(LoadError::ModelLoadFailed { .. })
    ));

    let mut session = ViewerSession::new(ViewerSettings::default(), 640.0, 480.0, 1.0);
    for event in events {
        apply(&mut session, event);
    }
    assert_eq!(session.phase(), LoadPhase::EnvironmentSet);
    let frame = session.tick();
    assert!(frame.has_environment);
    assert!(frame.model_matrix.is_none());
}

#[test]
fn baked_environment_matches_the_source_radiance() {
    let source = ScriptedSource::new(Outcome::Succeed, Outcome::Fail);
    let events = collect(&source);
    let LoadEvent::EnvironmentReady(environment) = &events[0] else {
        panic!("expected an environment first");
    };
    let mean = environment.reflection[0].mean_radiance();
    assert!((mean.x - 0.25).abs() < 1e-5);
    assert_eq!(environment.irradiance.width, 4);
}

#[test]
fn background_loader_delivers_in_order() {
    let source = ScriptedSource::new(Outcome::Succeed, Outcome::Succeed);
    let (tx, rx) = mpsc::channel();
    let handle = spawn_loader(source.clone(), small_bake(), move |event| {
        tx.send(event).unwrap();
    })
    .unwrap();
    handle.join().unwrap();

    let events: Vec<LoadEvent> = rx.iter().collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], LoadEvent::EnvironmentReady(_)));
    assert!(matches!(events[1], LoadEvent::ModelReady(_)));
    assert_eq!(source.environment_fetches.load(Ordering::SeqCst), 1);
}
