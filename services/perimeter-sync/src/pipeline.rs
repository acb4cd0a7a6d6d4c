//! Feature set to rendered document: dedup, reprojection, build, serialize.

use kml::{render, DocumentBuilder, KmlError};
use perimeter_common::{FeatureSet, PerimeterError};
use projection::{CrsTransform, ProjectionError};
use tracing::{debug, warn};

use crate::config::DeploymentConfig;
use crate::dedup::dedup_features;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] PerimeterError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("Failed to render KML: {0}")]
    Render(#[from] KmlError),
}

/// Text ready to be written, plus counts for logging.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub text: String,
    pub fetched: usize,
    pub retained: usize,
    pub placemarks: usize,
}

/// Resolve the coordinate transform for a feature set.
///
/// A configured source wins; otherwise the response's spatial reference is
/// used, and an undeclared or unknown one is assumed to match the target.
pub fn resolve_transform(
    config: &DeploymentConfig,
    features: &FeatureSet,
) -> Result<CrsTransform, PipelineError> {
    let target = config.projection.target_crs()?;
    let source = match config.projection.source_crs()? {
        Some(crs) => crs,
        None => match features.source_crs() {
            Some(crs) => crs,
            None => {
                if features.spatial_reference.is_some() {
                    warn!(
                        spatial_reference = ?features.spatial_reference,
                        target = %target,
                        "Unknown spatial reference, passing coordinates through"
                    );
                }
                target
            }
        },
    };
    Ok(CrsTransform::new(source, target)?)
}

/// Run one feature set through dedup, document building and serialization.
pub fn build_document(
    config: &DeploymentConfig,
    features: FeatureSet,
) -> Result<RenderedDocument, PipelineError> {
    let transform = resolve_transform(config, &features)?;
    let fetched = features.len();

    let retained = match &config.dedup {
        Some(dedup) => dedup_features(features.features, dedup),
        None => features.features,
    };

    let options = config.builder_options();
    let kml = DocumentBuilder::new(&options, &transform).build(&retained);
    let text = render(&kml)?;

    debug!(
        from = %transform.from,
        to = %transform.to,
        placemarks = kml.placemark_count(),
        "Document built"
    );

    Ok(RenderedDocument {
        text,
        fetched,
        retained: retained.len(),
        placemarks: kml.placemark_count(),
    })
}
