//! One prediction: coerce, encode, scale, classify.

use crate::bundle::{ArtifactBundle, LoadState};
use crate::error::PredictError;
use crate::record::{RequestRecord, NUMERIC_COLUMNS};

/// Label the classifier emits for "rain expected"
pub const RAIN_LABEL: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlook {
    Chance,
    NoChance,
}

impl Outlook {
    pub fn from_label(label: i64) -> Self {
        if label == RAIN_LABEL {
            Self::Chance
        } else {
            Self::NoChance
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub label: i64,
    pub outlook: Outlook,
}

impl ArtifactBundle {
    /// Run submitted form fields through the loaded artifacts.
    pub fn predict<I>(&self, fields: I) -> Result<Prediction, PredictError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (Some(classifier), Some(scaler)) = (self.classifier(), self.scaler()) else {
            return Err(PredictError::NotLoaded);
        };

        let mut record = RequestRecord::from_fields(fields);
        record.coerce_numeric(&NUMERIC_COLUMNS)?;
        record.encode_categoricals(self.encoders())?;

        let scaled = scaler.transform(&record)?;
        let label = classifier.predict(&scaled)?;

        Ok(Prediction {
            label,
            outlook: Outlook::from_label(label),
        })
    }
}

impl LoadState {
    /// Short-circuits with the stored diagnostic when startup loading failed.
    pub fn predict<I>(&self, fields: I) -> Result<Prediction, PredictError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        match self {
            Self::Failed(message) => Err(PredictError::LoadFailed(message.clone())),
            Self::Ready(bundle) => bundle.predict(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, LogisticRegression};
    use crate::encoder::EncoderArtifact;
    use crate::error::PredictFailure;
    use crate::scaler::ScalerArtifact;
    use std::sync::Arc;

    /// Always answers with the same label
    struct FixedLabel(i64);

    impl Classifier for FixedLabel {
        fn predict(&self, _features: &[f64]) -> Result<i64, PredictFailure> {
            Ok(self.0)
        }
    }

    fn identity_scaler(width: usize) -> Arc<ScalerArtifact> {
        Arc::new(ScalerArtifact::Standard {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
            feature_names: None,
        })
    }

    fn bundle(label: i64) -> ArtifactBundle {
        ArtifactBundle::default()
            .with_classifier(Arc::new(FixedLabel(label)))
            .with_scaler(identity_scaler(3))
            .with_encoder(
                "RainToday",
                Arc::new(EncoderArtifact::Label {
                    classes: vec!["No".into(), "Yes".into()],
                }),
            )
    }

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn good_form() -> Vec<(String, String)> {
        form(&[("MinTemp", "13.4"), ("Humidity3pm", "71"), ("RainToday", "Yes")])
    }

    #[test]
    fn test_rain_label_selects_chance() {
        let prediction = bundle(1).predict(good_form()).unwrap();
        assert_eq!(prediction.outlook, Outlook::Chance);
    }

    #[test]
    fn test_other_labels_select_no_chance() {
        assert_eq!(bundle(0).predict(good_form()).unwrap().outlook, Outlook::NoChance);
        assert_eq!(bundle(2).predict(good_form()).unwrap().outlook, Outlook::NoChance);
    }

    #[test]
    fn test_missing_classifier_is_not_loaded() {
        let bundle = ArtifactBundle::default().with_scaler(identity_scaler(1));
        let err = bundle.predict(good_form()).unwrap_err();
        assert!(matches!(err, PredictError::NotLoaded));
    }

    #[test]
    fn test_failed_state_returns_diagnostic_verbatim() {
        let state = LoadState::Failed("Encoders not found. Tried: x and []".into());
        let err = state.predict(good_form()).unwrap_err();
        assert_eq!(
            err.response_text(),
            "Model load error: Encoders not found. Tried: x and []"
        );
    }

    #[test]
    fn test_coercion_failure_is_reported() {
        let err = bundle(1)
            .predict(form(&[("MinTemp", "cold"), ("RainToday", "Yes"), ("x", "1")]))
            .unwrap_err();
        assert_eq!(
            err.response_text(),
            "Error: could not convert string to float: 'cold'"
        );
    }

    #[test]
    fn test_unseen_category_names_column() {
        let err = bundle(1)
            .predict(form(&[("MinTemp", "1"), ("Humidity3pm", "2"), ("RainToday", "Maybe")]))
            .unwrap_err();
        assert!(err.response_text().starts_with("Encoding Error for RainToday: "));
    }

    #[test]
    fn test_shape_mismatch_is_generic_error() {
        let err = bundle(1).predict(form(&[("MinTemp", "1")])).unwrap_err();
        assert_eq!(
            err.response_text(),
            "Error: X has 1 features, but StandardScaler is expecting 3 features as input"
        );
    }

    #[test]
    fn test_real_model_end_to_end() {
        let bundle = ArtifactBundle::new(
            Arc::new(LogisticRegression {
                coef: vec![0.0, 0.1, 2.0],
                intercept: -8.0,
                classes: [0, 1],
            }),
            identity_scaler(3),
            Default::default(),
        )
        .with_encoder(
            "RainToday",
            Arc::new(EncoderArtifact::Label {
                classes: vec!["No".into(), "Yes".into()],
            }),
        );

        let humid = form(&[("MinTemp", "10"), ("Humidity3pm", "90"), ("RainToday", "Yes")]);
        let dry = form(&[("MinTemp", "10"), ("Humidity3pm", "20"), ("RainToday", "No")]);
        assert_eq!(bundle.predict(humid).unwrap().label, 1);
        assert_eq!(bundle.predict(dry).unwrap().label, 0);
    }

    #[test]
    fn test_repeated_requests_are_identical() {
        let state = LoadState::from(bundle(1));
        let first = state.predict(good_form()).unwrap();
        for _ in 0..5 {
            assert_eq!(state.predict(good_form()).unwrap(), first);
        }
    }
}
