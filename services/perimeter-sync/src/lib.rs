//! Fire perimeter KML sync.
//!
//! Polls a feature service for fire perimeter polygons, keeps the latest
//! observation per mission, renders the result as a KML document and
//! optionally commits it to a git working tree.

pub mod config;
pub mod dedup;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod scheduler;

pub use config::DeploymentConfig;
pub use fetch::{FeatureSource, FetchError, HttpFeatureSource};
pub use pipeline::{build_document, PipelineError, RenderedDocument};
pub use publish::{GitPublisher, PublishError, PublishOutcome, Publisher};
pub use scheduler::{IterationOutcome, Scheduler};
