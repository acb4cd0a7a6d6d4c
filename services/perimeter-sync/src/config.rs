//! Deployment configuration loading.
//!
//! One YAML file per deployment under config/deployments/. Every
//! per-deployment difference (date filter, hole handling, centroid points,
//! publishing, delays) is a field here rather than a separate code path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use kml::BuilderOptions;
use perimeter_common::{CrsCode, PerimeterError, PerimeterResult};
use serde::Deserialize;
use tracing::{debug, info};

/// Root configuration loaded from a deployment YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    pub deployment: DeploymentInfo,
    pub source: SourceConfig,
    /// `null` keeps every feature.
    #[serde(default = "default_dedup")]
    pub dedup: Option<DedupConfig>,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub document: BuilderOptions,
    pub output: OutputConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Basic deployment identification.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Feature service query.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Full URL of the layer's `/query` endpoint.
    pub url: String,
    /// Fixed SQL filter, e.g. `source = 'CAL FIRE INTEL FLIGHT DATA'`.
    #[serde(rename = "where", default)]
    pub filter: String,
    /// Only request features modified within this many days.
    #[serde(default)]
    pub modified_within_days: Option<u32>,
    #[serde(default = "default_date_field")]
    pub date_field: String,
    #[serde(default)]
    pub return_centroid: bool,
    /// Output spatial reference WKID requested from the service.
    #[serde(default)]
    pub out_sr: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_date_field() -> String {
    "poly_DateCurrent".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Which attribute groups observations and which one picks the latest.
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_key_field")]
    pub key_field: String,
    #[serde(default = "default_tiebreak_field")]
    pub tiebreak_field: String,
}

fn default_key_field() -> String {
    "mission".to_string()
}

fn default_tiebreak_field() -> String {
    "OBJECTID".to_string()
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            key_field: default_key_field(),
            tiebreak_field: default_tiebreak_field(),
        }
    }
}

fn default_dedup() -> Option<DedupConfig> {
    Some(DedupConfig::default())
}

/// Source and target CRS for vertex reprojection.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    /// `auto` uses the response's `spatialReference`.
    #[serde(default = "default_projection_source")]
    pub source: String,
    #[serde(default = "default_projection_target")]
    pub target: String,
}

fn default_projection_source() -> String {
    "auto".to_string()
}

fn default_projection_target() -> String {
    "EPSG:4326".to_string()
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            source: default_projection_source(),
            target: default_projection_target(),
        }
    }
}

impl ProjectionConfig {
    /// Configured source CRS, or `None` for `auto`.
    pub fn source_crs(&self) -> PerimeterResult<Option<CrsCode>> {
        if self.source.trim().eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        CrsCode::from_epsg_string(&self.source).map(Some)
    }

    pub fn target_crs(&self) -> PerimeterResult<CrsCode> {
        CrsCode::from_epsg_string(&self.target)
    }
}

/// Where the KML lands.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl OutputConfig {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Git publishing of the written file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Working tree to commit in. Defaults to the output directory.
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Delays between iterations.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Delay after an iteration that produced a document.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Delay after an iteration that fetched nothing.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_backoff_secs() -> u64 {
    60
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl DeploymentConfig {
    /// Load and validate a deployment configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(
            deployment = %config.deployment.id,
            path = %path.display(),
            "Loaded deployment configuration"
        );
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DeploymentConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PerimeterResult<()> {
        if self.source.url.trim().is_empty() {
            return Err(PerimeterError::invalid_config("source.url", "must not be empty"));
        }
        if self.schedule.interval_secs == 0 {
            return Err(PerimeterError::invalid_config(
                "schedule.interval_secs",
                "must be greater than zero",
            ));
        }
        if self.schedule.backoff_secs == 0 {
            return Err(PerimeterError::invalid_config(
                "schedule.backoff_secs",
                "must be greater than zero",
            ));
        }
        if self.document.table.rows.is_empty() {
            return Err(PerimeterError::invalid_config(
                "document.table.rows",
                "at least one row is required",
            ));
        }
        if self.output.file_name.trim().is_empty() {
            return Err(PerimeterError::invalid_config(
                "output.file_name",
                "must not be empty",
            ));
        }
        self.projection.source_crs()?;
        self.projection.target_crs()?;
        Ok(())
    }

    /// Builder options with deployment rules applied: centroid points are
    /// only drawn for unfiltered queries.
    pub fn builder_options(&self) -> BuilderOptions {
        let mut options = self.document.clone();
        if options.centroid_points && self.source.modified_within_days.is_some() {
            debug!(
                deployment = %self.deployment.id,
                "Centroid points disabled because a date filter is configured"
            );
            options.centroid_points = false;
        }
        options
    }

    /// Whether the query must ask the service for centroids.
    pub fn wants_centroids(&self) -> bool {
        self.source.return_centroid || self.builder_options().centroid_points
    }

    /// Working tree used for publishing.
    pub fn publish_repo_dir(&self) -> PathBuf {
        self.publish
            .repo_dir
            .clone()
            .unwrap_or_else(|| self.output.dir.clone())
    }
}
