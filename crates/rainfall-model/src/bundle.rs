use std::sync::Arc;

use rainfall_core::ArtifactConfig;

use crate::classifier::{Classifier, ClassifierArtifact};
use crate::encoder::{into_encoder_map, CategoricalEncoder, EncoderFile, EncoderMap};
use crate::error::ArtifactError;
use crate::loader::load_artifact;
use crate::scaler::{FeatureScaler, ScalerArtifact};

/// The trained artifacts, shared read-only by every request.
#[derive(Clone, Default)]
pub struct ArtifactBundle {
    classifier: Option<Arc<dyn Classifier>>,
    scaler: Option<Arc<dyn FeatureScaler>>,
    encoders: EncoderMap,
}

impl ArtifactBundle {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        scaler: Arc<dyn FeatureScaler>,
        encoders: EncoderMap,
    ) -> Self {
        Self {
            classifier: Some(classifier),
            scaler: Some(scaler),
            encoders,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_scaler(mut self, scaler: Arc<dyn FeatureScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_encoder(
        mut self,
        column: impl Into<String>,
        encoder: Arc<dyn CategoricalEncoder>,
    ) -> Self {
        self.encoders.insert(column, encoder);
        self
    }

    pub fn classifier(&self) -> Option<&Arc<dyn Classifier>> {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> Option<&Arc<dyn FeatureScaler>> {
        self.scaler.as_ref()
    }

    pub fn encoders(&self) -> &EncoderMap {
        &self.encoders
    }

    /// Load the model, scaler and encoders in that order.
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        let base_dir = config.base_dir.as_path();

        let classifier: ClassifierArtifact =
            load_artifact(&config.model_path(), "Model", base_dir)?;
        let scaler: ScalerArtifact = load_artifact(&config.scaler_path(), "Scaler", base_dir)?;
        let encoders: EncoderFile = load_artifact(&config.encoders_path(), "Encoders", base_dir)?;

        Ok(Self::new(
            Arc::new(classifier),
            Arc::new(scaler),
            into_encoder_map(encoders.entries),
        ))
    }
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("classifier", &self.classifier.is_some())
            .field("scaler", &self.scaler.is_some())
            .field("encoders", &self.encoders.columns().collect::<Vec<_>>())
            .finish()
    }
}

/// Outcome of the one-time startup load.
///
/// A failure keeps only the diagnostic: artifacts that did load are dropped.
#[derive(Debug, Clone)]
pub enum LoadState {
    Ready(ArtifactBundle),
    Failed(String),
}

impl LoadState {
    pub fn load(config: &ArtifactConfig) -> Self {
        tracing::info!(
            "Loading artifacts (model: {}, scaler: {}, encoders: {}, base dir: {})",
            config.model_path().display(),
            config.scaler_path().display(),
            config.encoders_path().display(),
            config.base_dir.display()
        );

        match ArtifactBundle::load(config) {
            Ok(bundle) => {
                tracing::info!(
                    "Artifacts loaded ({} categorical encoders)",
                    bundle.encoders().len()
                );
                Self::Ready(bundle)
            }
            Err(e) => {
                tracing::error!("Artifact load failed: {}", e);
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The captured diagnostic, if loading failed
    pub fn load_error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Ready(_) => None,
        }
    }
}

impl From<ArtifactBundle> for LoadState {
    fn from(bundle: ArtifactBundle) -> Self {
        Self::Ready(bundle)
    }
}
