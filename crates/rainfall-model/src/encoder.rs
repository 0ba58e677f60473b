use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::EncodeError;

/// Maps a categorical value to the numeric code the model was trained on.
pub trait CategoricalEncoder: Send + Sync {
    /// Fails on a category that was not seen at fit time.
    fn encode(&self, value: &str) -> Result<f64, EncodeError>;
}

/// Column name -> encoder, in the order the encoder file lists them.
///
/// Encoding runs in this order, so it decides which column is reported when
/// several values are unseen.
#[derive(Clone, Default)]
pub struct EncoderMap {
    entries: Vec<(String, Arc<dyn CategoricalEncoder>)>,
}

impl EncoderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an encoder; an existing column keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, encoder: Arc<dyn CategoricalEncoder>) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = encoder,
            None => self.entries.push((column, encoder)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Arc<dyn CategoricalEncoder>> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, encoder)| encoder)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn CategoricalEncoder>)> {
        self.entries
            .iter()
            .map(|(name, encoder)| (name.as_str(), encoder))
    }
}

impl FromIterator<(String, Arc<dyn CategoricalEncoder>)> for EncoderMap {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn CategoricalEncoder>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (column, encoder) in iter {
            map.insert(column, encoder);
        }
        map
    }
}

/// Serialized encoder, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncoderArtifact {
    /// Code is the value's index in `classes`.
    Label { classes: Vec<String> },
    /// Explicit value -> code table.
    Ordinal { categories: BTreeMap<String, f64> },
}

impl CategoricalEncoder for EncoderArtifact {
    fn encode(&self, value: &str) -> Result<f64, EncodeError> {
        match self {
            Self::Label { classes } => classes
                .iter()
                .position(|class| class == value)
                .map(|index| index as f64)
                .ok_or_else(|| EncodeError::UnseenLabel(value.to_string())),
            Self::Ordinal { categories } => categories
                .get(value)
                .copied()
                .ok_or_else(|| EncodeError::UnseenLabel(value.to_string())),
        }
    }
}

/// Contents of the encoder file, entries in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderFile {
    pub entries: Vec<(String, EncoderArtifact)>,
}

impl<'de> Deserialize<'de> for EncoderFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EncoderFileVisitor;

        impl<'de> Visitor<'de> for EncoderFileVisitor {
            type Value = EncoderFile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to encoder")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((column, encoder)) =
                    access.next_entry::<String, EncoderArtifact>()?
                {
                    entries.push((column, encoder));
                }
                Ok(EncoderFile { entries })
            }
        }

        deserializer.deserialize_map(EncoderFileVisitor)
    }
}

/// Turn deserialized encoders into the shared lookup table, keeping order
pub fn into_encoder_map<I>(artifacts: I) -> EncoderMap
where
    I: IntoIterator<Item = (String, EncoderArtifact)>,
{
    artifacts
        .into_iter()
        .map(|(column, encoder)| (column, Arc::new(encoder) as Arc<dyn CategoricalEncoder>))
        .collect()
}
