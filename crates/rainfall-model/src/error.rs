//! Error kinds for artifact loading and each prediction stage.
//!
//! The `Display` output of [`PredictError`] is the exact response body sent
//! back for a failed `/predict` request.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to locate or deserialize a trained artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{desc} not found. Tried: {} and [{}]", .primary.display(), format_paths(.candidates))]
    NotFound {
        desc: String,
        primary: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("{desc} could not be read from {}: {source}", .path.display())]
    Io {
        desc: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{desc} at {} is not a valid artifact: {source}", .path.display())]
    Parse {
        desc: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A categorical encoder rejected a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("y contains previously unseen labels: '{0}'")]
    UnseenLabel(String),
}

/// A form value in a numeric column did not parse as a float.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not convert string to float: '{value}'")]
pub struct CoercionError {
    pub column: String,
    pub value: String,
}

/// The scaler could not turn the record into a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("could not convert string to float: '{0}'")]
    NotNumeric(String),

    #[error("X has {got} features, but {scaler} is expecting {expected} features as input")]
    FeatureCount {
        scaler: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("feature names mismatch: expected {expected:?}, got {got:?}")]
    FeatureNames {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("scaler artifact is malformed: {0}")]
    Malformed(String),
}

/// The classifier could not produce a label.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictFailure {
    #[error("X has {got} features, but {model} is expecting {expected} features as input")]
    FeatureCount {
        model: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("classifier artifact is malformed: {0}")]
    Malformed(String),
}

/// Everything that can end a `/predict` request without a result page.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Model load error: {0}")]
    LoadFailed(String),

    #[error("Model or scaler not loaded. Check server logs for details.")]
    NotLoaded,

    #[error("Error: {0}")]
    Coercion(#[from] CoercionError),

    #[error("Encoding Error for {column}: {source}")]
    Encoding {
        column: String,
        #[source]
        source: EncodeError,
    },

    #[error("Error: {0}")]
    Transform(#[from] TransformError),

    #[error("Error: {0}")]
    Predict(#[from] PredictFailure),
}

impl PredictError {
    /// Plain-text body returned to the client
    pub fn response_text(&self) -> String {
        self.to_string()
    }

    /// Stage name used in logs
    pub fn stage(&self) -> &'static str {
        match self {
            Self::LoadFailed(_) | Self::NotLoaded => "load",
            Self::Coercion(_) => "coerce",
            Self::Encoding { .. } => "encode",
            Self::Transform(_) => "scale",
            Self::Predict(_) => "predict",
        }
    }
}

impl ArtifactError {
    pub(crate) fn not_found(desc: &str, primary: &Path, candidates: Vec<PathBuf>) -> Self {
        Self::NotFound {
            desc: desc.to_string(),
            primary: primary.to_path_buf(),
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_every_attempted_path() {
        let err = ArtifactError::not_found(
            "Model",
            Path::new("/srv/rainfall.json"),
            vec![
                PathBuf::from("/app/rainfall.json"),
                PathBuf::from("/app/models/rainfall.json"),
                PathBuf::from("/app/data/rainfall.json"),
            ],
        );
        assert_eq!(
            err.to_string(),
            "Model not found. Tried: /srv/rainfall.json and \
             ['/app/rainfall.json', '/app/models/rainfall.json', '/app/data/rainfall.json']"
        );
    }

    #[test]
    fn test_response_text_per_stage() {
        let err = PredictError::LoadFailed("Scaler not found".into());
        assert_eq!(err.response_text(), "Model load error: Scaler not found");

        let err = PredictError::from(CoercionError {
            column: "MinTemp".into(),
            value: "warm".into(),
        });
        assert_eq!(
            err.response_text(),
            "Error: could not convert string to float: 'warm'"
        );

        let err = PredictError::Encoding {
            column: "Location".into(),
            source: EncodeError::UnseenLabel("Atlantis".into()),
        };
        assert_eq!(
            err.response_text(),
            "Encoding Error for Location: y contains previously unseen labels: 'Atlantis'"
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PredictError::NotLoaded.stage(), "load");
        assert_eq!(
            PredictError::Transform(TransformError::NotNumeric("x".into())).stage(),
            "scale"
        );
    }
}
