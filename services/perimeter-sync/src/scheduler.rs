//! Fetch, build, write and publish loop.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

use crate::config::DeploymentConfig;
use crate::fetch::{FeatureSource, FetchError};
use crate::output::{write_document, WriteError};
use crate::pipeline::{build_document, PipelineError};
use crate::publish::{PublishError, PublishOutcome, Publisher};

/// What one iteration did. Every recoverable failure has its own variant.
#[derive(Debug)]
pub enum IterationOutcome {
    /// The service answered with no features.
    Empty,
    /// The request, the response or the service itself failed.
    FetchFailed(FetchError),
    /// Features were fetched but no document could be produced.
    BuildFailed(PipelineError),
    /// The document was built but could not be written.
    WriteFailed(WriteError),
    Written {
        path: PathBuf,
        fetched: usize,
        retained: usize,
        placemarks: usize,
        bytes: u64,
        /// `None` when publishing is disabled.
        publish: Option<Result<PublishOutcome, PublishError>>,
    },
}

impl IterationOutcome {
    /// Whether the next iteration should come after the short backoff.
    pub fn needs_backoff(&self) -> bool {
        matches!(self, Self::Empty | Self::FetchFailed(_))
    }
}

/// Drives one deployment.
pub struct Scheduler<S, P> {
    source: S,
    publisher: Option<P>,
    config: DeploymentConfig,
}

impl<S, P> Scheduler<S, P>
where
    S: FeatureSource,
    P: Publisher,
{
    pub fn new(source: S, publisher: Option<P>, config: DeploymentConfig) -> Self {
        Self {
            source,
            publisher,
            config,
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Run a single iteration.
    #[instrument(skip(self), fields(deployment = %self.config.deployment.id))]
    pub async fn run_once(&self) -> IterationOutcome {
        let features = match self.source.fetch().await {
            Ok(features) => features,
            Err(e) => {
                error!(error = %e, "Fetch failed");
                return IterationOutcome::FetchFailed(e);
            }
        };

        if features.is_empty() {
            warn!("No features returned");
            return IterationOutcome::Empty;
        }

        let document = match build_document(&self.config, features) {
            Ok(document) => document,
            Err(e) => {
                error!(error = %e, "Failed to build document");
                return IterationOutcome::BuildFailed(e);
            }
        };

        let path = self.config.output.path();
        let bytes = match write_document(&path, &document.text).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Failed to write document");
                return IterationOutcome::WriteFailed(e);
            }
        };

        info!(
            path = %path.display(),
            fetched = document.fetched,
            retained = document.retained,
            placemarks = document.placemarks,
            bytes,
            "KML document written"
        );

        let publish = match &self.publisher {
            Some(publisher) => {
                let result = publisher.publish(&path).await;
                if let Err(e) = &result {
                    error!(error = %e, path = %path.display(), "Publish failed");
                }
                Some(result)
            }
            None => None,
        };

        IterationOutcome::Written {
            path,
            fetched: document.fetched,
            retained: document.retained,
            placemarks: document.placemarks,
            bytes,
            publish,
        }
    }

    /// Delay before the iteration that follows `outcome`.
    pub fn delay_after(&self, outcome: &IterationOutcome) -> Duration {
        if outcome.needs_backoff() {
            self.config.schedule.backoff()
        } else {
            self.config.schedule.interval()
        }
    }

    /// Run one iteration and return it with the delay to wait afterwards.
    pub async fn step(&self) -> (IterationOutcome, Duration) {
        let outcome = self.run_once().await;
        let delay = self.delay_after(&outcome);
        (outcome, delay)
    }

    /// Loop until a shutdown signal arrives. Iteration failures never end
    /// the loop.
    pub async fn run_forever(&self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            let (outcome, delay) = self.step().await;
            if outcome.needs_backoff() {
                info!(delay_secs = delay.as_secs(), "Backing off before retry");
            } else {
                info!(delay_secs = delay.as_secs(), "Sleeping until next iteration");
            }

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutting down scheduler");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
