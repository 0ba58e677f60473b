//! Rain prediction model layer
//!
//! Loads the trained artifacts (classifier, feature scaler, per-column
//! categorical encoders) once at startup and runs submitted weather
//! measurements through them.

pub mod bundle;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod scaler;
pub mod tree;

pub use bundle::{ArtifactBundle, LoadState};
pub use classifier::{Classifier, ClassifierArtifact, LogisticRegression};
pub use encoder::{into_encoder_map, CategoricalEncoder, EncoderArtifact, EncoderFile, EncoderMap};
pub use error::{
    ArtifactError, CoercionError, EncodeError, PredictError, PredictFailure, TransformError,
};
pub use loader::{candidate_paths, load_artifact, locate};
pub use pipeline::{Outlook, Prediction, RAIN_LABEL};
pub use record::{Cell, RequestRecord, NUMERIC_COLUMNS};
pub use scaler::{FeatureScaler, ScalerArtifact};
pub use tree::{DecisionTree, RandomForest};
