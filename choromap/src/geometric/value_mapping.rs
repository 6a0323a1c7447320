use anyhow::Context;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{PreconditionError, RenderError};

/// Join key -> numeric value, e.g. ZIP code -> number of cars
///
/// Always non-empty, with unique keys and finite values; the constructors reject anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMapping {
    values: BTreeMap<String, f64>,
}

impl ValueMapping {
    pub fn new<K, I>(entries: I) -> Result<Self, PreconditionError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in entries {
            let key = key.into();
            if !value.is_finite() {
                return Err(PreconditionError::NonFiniteValue { key, value });
            }
            if values.contains_key(&key) {
                return Err(PreconditionError::DuplicateKey(key));
            }
            values.insert(key, value);
        }
        if values.is_empty() {
            return Err(PreconditionError::EmptyValueMapping);
        }
        Ok(ValueMapping { values })
    }

    /// Build from a JSON object such as `{"92037": 120.0, "92092": 100}`
    pub fn from_json_value(value: &Value) -> Result<Self, PreconditionError> {
        let object = value
            .as_object()
            .ok_or_else(|| PreconditionError::InvalidValueMapping(value.to_string()))?;

        let mut entries = Vec::with_capacity(object.len());
        for (key, item) in object {
            let number = item.as_f64().ok_or_else(|| PreconditionError::NonNumericValue {
                key: key.clone(),
                found: item.to_string(),
            })?;
            entries.push((key.clone(), number));
        }
        ValueMapping::new(entries)
    }

    /// Read a JSON object file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read value mapping: {:?}", path))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse value mapping JSON: {:?}", path))?;
        Ok(ValueMapping::from_json_value(&value)?)
    }

    /// Read two columns of a CSV file with a header row
    #[cfg(feature = "csv")]
    pub fn from_csv_file<P: AsRef<Path>>(
        path: P,
        key_column: &str,
        value_column: &str,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open value mapping CSV: {:?}", path))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {:?}", path))?
            .clone();
        let column_index = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("Column '{}' not found in {:?}", name, path))
        };
        let key_idx = column_index(key_column)?;
        let value_idx = column_index(value_column)?;

        let mut entries: Vec<(String, f64)> = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Failed to read CSV record: {:?}", path))?;
            let key = record.get(key_idx).unwrap_or_default().to_string();
            let raw = record.get(value_idx).unwrap_or_default();

            let number = raw
                .parse::<f64>()
                .map_err(|_| PreconditionError::NonNumericValue {
                    key: key.clone(),
                    found: raw.to_string(),
                })?;
            entries.push((key, number));
        }

        Ok(ValueMapping::new(entries)?)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Anything a render call accepts as its value mapping
pub trait IntoValueMapping {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError>;
}

impl IntoValueMapping for ValueMapping {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        Ok(self)
    }
}

impl IntoValueMapping for &ValueMapping {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        Ok(self.clone())
    }
}

impl<K: Into<String>> IntoValueMapping for HashMap<K, f64> {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        ValueMapping::new(self)
    }
}

impl<K: Into<String>> IntoValueMapping for BTreeMap<K, f64> {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        ValueMapping::new(self)
    }
}

impl<K: Into<String>> IntoValueMapping for Vec<(K, f64)> {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        ValueMapping::new(self)
    }
}

impl IntoValueMapping for &Value {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        ValueMapping::from_json_value(self)
    }
}

impl IntoValueMapping for Value {
    fn into_value_mapping(self) -> Result<ValueMapping, PreconditionError> {
        ValueMapping::from_json_value(&self)
    }
}
