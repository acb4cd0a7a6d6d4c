//! Scheduler tests with in-memory feature sources and publishers.
//!
//! Each test writes into its own temporary directory; nothing touches the
//! network or a real git repository.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use perimeter_common::{FeatureSet, ServiceResponse};
use perimeter_sync::fetch::decode_body;
use perimeter_sync::{
    DeploymentConfig, FeatureSource, FetchError, IterationOutcome, PublishError, PublishOutcome,
    Publisher, Scheduler,
};
use tempfile::TempDir;
use test_utils::fixtures;
use tokio::sync::broadcast;
use tokio_test::assert_ok;

// ============================================================================
// Test doubles
// ============================================================================

/// Replays canned fetch results in order, then keeps returning empty sets.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<FeatureSet, FetchError>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<FeatureSet, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl FeatureSource for ScriptedSource {
    async fn fetch(&self) -> Result<FeatureSet, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FeatureSet::default()))
    }
}

/// Records published paths; optionally fails every publish. The record is
/// shared so tests can inspect it after handing the publisher over.
struct RecordingPublisher {
    published: Arc<Mutex<Vec<PathBuf>>>,
    fail: bool,
}

impl RecordingPublisher {
    fn new(fail: bool) -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            fail,
        }
    }

    fn record(&self) -> Arc<Mutex<Vec<PathBuf>>> {
        Arc::clone(&self.published)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, path: &Path) -> Result<PublishOutcome, PublishError> {
        self.published.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            Err(PublishError::Push("remote rejected".to_string()))
        } else {
            Ok(PublishOutcome::Published {
                message: "Add test.kml".to_string(),
            })
        }
    }
}

fn features(json: &str) -> FeatureSet {
    ServiceResponse::from_json(json).unwrap().into_result().unwrap()
}

fn config(dir: &Path) -> DeploymentConfig {
    let yaml = format!(
        r#"
deployment:
  id: test
source:
  url: "https://example.com/query"
output:
  dir: "{}"
  file_name: perimeters.kml
schedule:
  interval_secs: 300
  backoff_secs: 60
"#,
        dir.display()
    );
    DeploymentConfig::from_yaml(&yaml).unwrap()
}

// ============================================================================
// Iteration outcomes
// ============================================================================

#[tokio::test]
async fn test_written_iteration() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Ok(features(fixtures::TWO_FEATURES))]);
    let scheduler = Scheduler::new(source, None::<RecordingPublisher>, config(dir.path()));

    match scheduler.run_once().await {
        IterationOutcome::Written {
            path,
            fetched,
            retained,
            placemarks,
            bytes,
            publish,
        } => {
            assert_eq!(path, dir.path().join("perimeters.kml"));
            assert_eq!(fetched, 2);
            assert_eq!(retained, 2);
            assert_eq!(placemarks, 3);
            assert!(publish.is_none());

            let text = std::fs::read_to_string(&path).unwrap();
            assert_eq!(text.len() as u64, bytes);
            assert_eq!(text.matches("<Placemark").count(), 3);
            assert!(text.contains("<td>Park</td>"));
        }
        other => panic!("expected Written, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dedup_keeps_latest_observation() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Ok(features(fixtures::DUPLICATE_MISSIONS))]);
    let scheduler = Scheduler::new(source, None::<RecordingPublisher>, config(dir.path()));

    match scheduler.run_once().await {
        IterationOutcome::Written { retained, .. } => assert_eq!(retained, 1),
        other => panic!("expected Written, got {:?}", other),
    }

    let text = std::fs::read_to_string(dir.path().join("perimeters.kml")).unwrap();
    assert!(text.contains("<coordinates>0,0,0 2,0,0 0,0,0</coordinates>"));
    assert!(!text.contains("Orphan"));
}

#[tokio::test]
async fn test_empty_fetch_backs_off_once() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![
        Ok(features(fixtures::EMPTY)),
        Ok(features(fixtures::TWO_FEATURES)),
    ]);
    let scheduler = Scheduler::new(source, None::<RecordingPublisher>, config(dir.path()));

    let (first, first_delay) = scheduler.step().await;
    assert!(matches!(first, IterationOutcome::Empty));
    assert_eq!(first_delay, Duration::from_secs(60));

    let (second, second_delay) = scheduler.step().await;
    assert!(matches!(second, IterationOutcome::Written { .. }));
    assert_eq!(second_delay, Duration::from_secs(300));
}

#[tokio::test]
async fn test_fetch_failure_backs_off() {
    let dir = TempDir::new().unwrap();
    let error = decode_body(fixtures::SERVICE_ERROR).unwrap_err();
    let source = ScriptedSource::new(vec![Err(error)]);
    let scheduler = Scheduler::new(source, None::<RecordingPublisher>, config(dir.path()));

    let (outcome, delay) = scheduler.step().await;
    assert!(matches!(
        outcome,
        IterationOutcome::FetchFailed(FetchError::Service { code: 400, .. })
    ));
    assert_eq!(delay, Duration::from_secs(60));
    assert!(!dir.path().join("perimeters.kml").exists());
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let source = ScriptedSource::new(vec![Ok(features(fixtures::TWO_FEATURES))]);
    let scheduler = Scheduler::new(source, None::<RecordingPublisher>, config(&blocker));

    let (outcome, delay) = scheduler.step().await;
    assert!(matches!(outcome, IterationOutcome::WriteFailed(_)));
    assert_eq!(delay, Duration::from_secs(300));
}

// ============================================================================
// Publishing
// ============================================================================

#[tokio::test]
async fn test_publish_after_write() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Ok(features(fixtures::TWO_FEATURES))]);
    let scheduler = Scheduler::new(source, Some(RecordingPublisher::new(false)), config(dir.path()));

    match scheduler.run_once().await {
        IterationOutcome::Written {
            publish: Some(result),
            ..
        } => {
            let outcome = assert_ok!(result);
            assert!(matches!(outcome, PublishOutcome::Published { .. }));
        }
        other => panic!("expected published Written, got {:?}", other),
    }
}

#[tokio::test]
async fn test_publish_failure_does_not_stop_next_iteration() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![
        Ok(features(fixtures::TWO_FEATURES)),
        Ok(features(fixtures::TWO_FEATURES)),
    ]);
    let scheduler = Scheduler::new(source, Some(RecordingPublisher::new(true)), config(dir.path()));

    for _ in 0..2 {
        let (outcome, delay) = scheduler.step().await;
        match outcome {
            IterationOutcome::Written {
                publish: Some(Err(PublishError::Push(_))),
                ..
            } => {}
            other => panic!("expected failed publish, got {:?}", other),
        }
        assert_eq!(delay, Duration::from_secs(300));
    }
}

#[tokio::test]
async fn test_nothing_published_when_fetch_is_empty() {
    let dir = TempDir::new().unwrap();
    let publisher = RecordingPublisher::new(false);
    let published = publisher.record();
    let source = ScriptedSource::new(vec![]);
    let scheduler = Scheduler::new(source, Some(publisher), config(dir.path()));

    assert!(matches!(scheduler.run_once().await, IterationOutcome::Empty));
    assert!(published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_publisher_receives_written_path() {
    let dir = TempDir::new().unwrap();
    let publisher = RecordingPublisher::new(false);
    let published = publisher.record();
    let source = ScriptedSource::new(vec![
        Ok(features(fixtures::EMPTY)),
        Ok(features(fixtures::TWO_FEATURES)),
    ]);
    let scheduler = Scheduler::new(source, Some(publisher), config(dir.path()));

    scheduler.run_once().await;
    assert!(published.lock().unwrap().is_empty());

    scheduler.run_once().await;
    assert_eq!(
        *published.lock().unwrap(),
        vec![dir.path().join("perimeters.kml")]
    );
}

// ============================================================================
// Loop
// ============================================================================

#[tokio::test]
async fn test_run_forever_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Ok(features(fixtures::TWO_FEATURES))]);
    let scheduler = Scheduler::new(source, None::<RecordingPublisher>, config(dir.path()));

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    shutdown_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(5), scheduler.run_forever(shutdown_rx))
        .await
        .unwrap();
    assert!(dir.path().join("perimeters.kml").exists());
}
