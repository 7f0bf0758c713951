//! Session bootstrap and event loop.
//!
//! ```text
//! start(source, engine)
//!   ├── preload()            four core datasets, joined; any failure aborts
//!   ├── SpatialIndex::build
//!   ├── load_isochrones()    degrades to "unavailable" on failure
//!   └── reinstall()          only if the style is already loaded
//!
//! run(controller, events, cancel)
//!   loop: wait for an event ─► drain queued events ─► run due tasks
//! ```
//!
//! The controller is exclusively borrowed by the loop; nothing else touches
//! it while the session runs.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::{MapEngine, MapEvent};
use crate::isochrone::load_isochrones;
use crate::source::{preload, DatasetSource, PreloadError};
use crate::visibility::OverlayController;

/// Load every dataset and build a controller around `engine`.
pub async fn start<S, E>(source: &S, engine: E) -> Result<OverlayController<E>, PreloadError>
where
    S: DatasetSource,
    E: MapEngine,
{
    let datasets = preload(source).await?;
    let index = datasets.index();
    let isochrones = load_isochrones(source, &index.school_slugs()).await;

    let mut controller = OverlayController::new(engine, index, isochrones);
    if controller.engine().is_style_loaded() {
        controller.reinstall();
    }
    Ok(controller)
}

/// Counters of a finished session loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    /// Wake-ups; each drains every queued event before running tasks.
    pub batches: usize,
}

/// Feed engine events into the controller until cancelled or the channel closes.
///
/// Events already queued when the loop wakes are handled as one batch, so a
/// burst of style notifications collapses into a single reinstallation.
pub async fn run<E: MapEngine>(
    controller: &mut OverlayController<E>,
    events: &mut mpsc::Receiver<MapEvent>,
    cancel: CancellationToken,
) -> RunSummary {
    let mut summary = RunSummary::default();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Session cancelled");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    debug!("Event channel closed");
                    break;
                };
                summary.batches += 1;
                summary.events += 1;
                controller.handle_event(event);
                while let Ok(event) = events.try_recv() {
                    summary.events += 1;
                    controller.handle_event(event);
                }
                controller.run_pending();
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::source::{Dataset, DirectorySource, PRELOAD_FAILURE_MESSAGE};
    use tempfile::TempDir;

    fn write_datasets(dir: &TempDir) {
        let files = [
            (
                Dataset::NeighborhoodLimits,
                r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{"denumire":"Downtown","slug":"dtn"}}]}"#,
            ),
            (
                Dataset::Streets,
                r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{"cartier":"dtn","arondat":"s1"}}]}"#,
            ),
            (
                Dataset::Schools,
                r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[24.1,45.7]},"properties":{"slug":"s1","denumire":"Școala 1"}}]}"#,
            ),
            (Dataset::Buildings, r#"{"type":"FeatureCollection","features":[]}"#),
        ];
        for (dataset, body) in files {
            std::fs::write(dir.path().join(dataset.file_name()), body).unwrap();
        }
    }

    #[tokio::test]
    async fn test_start_installs_when_style_loaded() {
        let dir = TempDir::new().unwrap();
        write_datasets(&dir);

        let controller = start(&DirectorySource::new(dir.path()), MemoryEngine::new())
            .await
            .unwrap();

        assert_eq!(controller.installation().generation(), 1);
        assert!(controller.engine().has_layer("nb__dtn__bg"));
        assert_eq!(controller.engine().marker_count(), 1);
    }

    #[tokio::test]
    async fn test_start_defers_until_load() {
        let dir = TempDir::new().unwrap();
        write_datasets(&dir);
        let mut engine = MemoryEngine::new();
        engine.set_style_loaded(false);

        let mut controller = start(&DirectorySource::new(dir.path()), engine).await.unwrap();
        assert_eq!(controller.installation().generation(), 0);

        controller.engine_mut().set_style_loaded(true);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(MapEvent::Load).await.unwrap();
        drop(tx);
        run(&mut controller, &mut rx, CancellationToken::new()).await;

        assert_eq!(controller.installation().generation(), 1);
    }

    #[tokio::test]
    async fn test_start_fails_without_core_datasets() {
        let dir = TempDir::new().unwrap();
        let err = start(&DirectorySource::new(dir.path()), MemoryEngine::new())
            .await
            .err()
            .unwrap();
        assert_eq!(err.panel_message(), PRELOAD_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_queued_burst_is_one_batch() {
        let dir = TempDir::new().unwrap();
        write_datasets(&dir);
        let mut controller = start(&DirectorySource::new(dir.path()), MemoryEngine::new())
            .await
            .unwrap();

        controller.engine_mut().reset_style();
        let (tx, mut rx) = mpsc::channel(16);
        for _ in 0..6 {
            tx.send(MapEvent::StyleData).await.unwrap();
        }
        drop(tx);

        let summary = run(&mut controller, &mut rx, CancellationToken::new()).await;

        assert_eq!(summary, RunSummary { events: 6, batches: 1 });
        assert_eq!(controller.installation().generation(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_stops_loop() {
        let dir = TempDir::new().unwrap();
        write_datasets(&dir);
        let mut controller = start(&DirectorySource::new(dir.path()), MemoryEngine::new())
            .await
            .unwrap();
        let (_tx, mut rx) = mpsc::channel::<MapEvent>(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = run(&mut controller, &mut rx, cancel).await;
        assert_eq!(summary, RunSummary::default());
    }
}
