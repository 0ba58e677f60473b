//! The single-row table built from one form submission.

use crate::encoder::EncoderMap;
use crate::error::{CoercionError, PredictError, TransformError};

/// Columns coerced to floats before encoding
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "MinTemp",
    "MaxTemp",
    "Rainfall",
    "Humidity9am",
    "Humidity3pm",
    "Pressure9am",
    "Pressure3pm",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

/// One row, columns in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestRecord {
    columns: Vec<(String, Cell)>,
}

impl RequestRecord {
    /// Build a row from form pairs. A repeated field keeps its first position
    /// and its last value.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut columns: Vec<(String, Cell)> = Vec::new();
        for (name, value) in fields {
            match columns.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, cell)) => *cell = Cell::Text(value),
                None => columns.push((name, Cell::Text(value))),
            }
        }
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    /// Parse every present whitelisted column as a float.
    pub fn coerce_numeric(&mut self, whitelist: &[&str]) -> Result<(), CoercionError> {
        for (name, cell) in &mut self.columns {
            if !whitelist.contains(&name.as_str()) {
                continue;
            }
            if let Cell::Text(raw) = &*cell {
                let value = parse_float(raw).ok_or_else(|| CoercionError {
                    column: name.clone(),
                    value: raw.clone(),
                })?;
                *cell = Cell::Number(value);
            }
        }
        Ok(())
    }

    /// Replace each column that has an encoder with its numeric code.
    ///
    /// Columns are visited in encoder order; the first rejected value stops
    /// the walk.
    pub fn encode_categoricals(&mut self, encoders: &EncoderMap) -> Result<(), PredictError> {
        for (column, encoder) in encoders.iter() {
            let Some((_, cell)) = self.columns.iter_mut().find(|(name, _)| name == column) else {
                continue;
            };
            let raw = match &*cell {
                Cell::Text(text) => text.clone(),
                Cell::Number(number) => number.to_string(),
            };
            let code = encoder
                .encode(&raw)
                .map_err(|source| PredictError::Encoding {
                    column: column.to_string(),
                    source,
                })?;
            *cell = Cell::Number(code);
        }
        Ok(())
    }

    /// The row as a dense feature vector; any remaining text cell fails.
    pub fn to_features(&self) -> Result<Vec<f64>, TransformError> {
        self.columns
            .iter()
            .map(|(_, cell)| match cell {
                Cell::Number(value) => Ok(*value),
                Cell::Text(raw) => {
                    parse_float(raw).ok_or_else(|| TransformError::NotNumeric(raw.clone()))
                }
            })
            .collect()
    }
}

/// Lenient float parsing: surrounding whitespace is ignored.
fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
