use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::record::RequestRecord;

/// Normalizes a record into the feature vector the classifier expects.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, record: &RequestRecord) -> Result<Vec<f64>, TransformError>;
}

/// Serialized scaler, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    /// `x * scale + min`
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

impl ScalerArtifact {
    fn name(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "StandardScaler",
            Self::MinMax { .. } => "MinMaxScaler",
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => {
                feature_names.as_deref()
            }
        }
    }

    fn params(&self) -> (&[f64], &[f64]) {
        match self {
            Self::Standard { mean, scale, .. } => (mean.as_slice(), scale.as_slice()),
            Self::MinMax { min, scale, .. } => (min.as_slice(), scale.as_slice()),
        }
    }

    /// Check the record's columns against what the scaler was fitted on.
    ///
    /// Names are compared when they were recorded at fit time, otherwise only
    /// the column count.
    fn check_columns(&self, record: &RequestRecord) -> Result<(), TransformError> {
        let (offsets, scale) = self.params();
        if offsets.len() != scale.len() {
            return Err(TransformError::Malformed(format!(
                "{} has {} offsets but {} scale factors",
                self.name(),
                offsets.len(),
                scale.len()
            )));
        }

        if let Some(expected) = self.feature_names() {
            let got = record.column_names();
            if got != expected {
                return Err(TransformError::FeatureNames {
                    expected: expected.to_vec(),
                    got,
                });
            }
        }

        if record.len() != scale.len() {
            return Err(TransformError::FeatureCount {
                scaler: self.name(),
                got: record.len(),
                expected: scale.len(),
            });
        }

        Ok(())
    }
}

impl FeatureScaler for ScalerArtifact {
    fn transform(&self, record: &RequestRecord) -> Result<Vec<f64>, TransformError> {
        self.check_columns(record)?;
        let features = record.to_features()?;

        let scaled: Vec<f64> = match self {
            Self::Standard { mean, scale, .. } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| {
                    // zero variance columns are left centered but unscaled
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            Self::MinMax { min, scale, .. } => features
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (lo, s))| x * s + lo)
                .collect(),
        };

        Ok(scaled)
    }
}
