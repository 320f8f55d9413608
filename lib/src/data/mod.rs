//! Raw dataset records and the cleaning step that turns them into
//! `(horsepower, mpg)` pairs.

pub mod source;

pub use source::{DatasetSource, FetchError, HttpSource, InMemorySource};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::FieldMapping;

/// One entry of the source array: an arbitrary JSON object.
///
/// Non-object entries are kept as records without fields, so they are dropped
/// by cleaning instead of failing the fetch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Builds a record with the default horsepower/mpg field names.
    ///
    /// ```
    /// use horsepower_mpg::data::RawRecord;
    ///
    /// let r = RawRecord::new(Some(130.0), None);
    /// assert_eq!(r.horsepower(), Some(130.0));
    /// assert_eq!(r.miles_per_gallon(), None);
    /// ```
    pub fn new(horsepower: Option<f64>, mpg: Option<f64>) -> Self {
        let fields = FieldMapping::default();
        let mut map = Map::new();
        map.insert(fields.horsepower, horsepower.map_or(Value::Null, Value::from));
        map.insert(fields.mpg, mpg.map_or(Value::Null, Value::from));
        Self(map)
    }

    /// Numeric value of `field`. Missing, null, non-numeric and
    /// non-finite values are all `None`.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.0
            .get(field)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    pub fn horsepower(&self) -> Option<f64> {
        self.number(&FieldMapping::default().horsepower)
    }

    pub fn miles_per_gallon(&self) -> Option<f64> {
        self.number(&FieldMapping::default().mpg)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

impl From<RawRecord> for Value {
    fn from(record: RawRecord) -> Self {
        Value::Object(record.0)
    }
}

/// A record with both regression fields present and finite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub horsepower: f64,
    pub mpg: f64,
}

/// Keeps the records that carry numeric horsepower and mpg values.
///
/// Order is preserved, duplicates are kept and malformed records are dropped
/// without error.
#[derive(Clone, Debug, Default)]
pub struct DataCleaner {
    fields: FieldMapping,
}

impl DataCleaner {
    pub fn new(fields: FieldMapping) -> Self {
        Self { fields }
    }

    /// # Example
    /// ```
    /// use horsepower_mpg::data::{CleanedRecord, DataCleaner, RawRecord};
    ///
    /// let raw = vec![
    ///     RawRecord::new(Some(130.0), Some(18.0)),
    ///     RawRecord::new(None, Some(20.0)),
    /// ];
    /// let cleaned = DataCleaner::default().clean(&raw);
    /// assert_eq!(cleaned, vec![CleanedRecord { horsepower: 130.0, mpg: 18.0 }]);
    /// ```
    pub fn clean(&self, raw: &[RawRecord]) -> Vec<CleanedRecord> {
        let cleaned: Vec<CleanedRecord> = raw
            .iter()
            .filter_map(|r| {
                Some(CleanedRecord {
                    horsepower: r.number(&self.fields.horsepower)?,
                    mpg: r.number(&self.fields.mpg)?,
                })
            })
            .collect();
        tracing::debug!(
            kept = cleaned.len(),
            dropped = raw.len() - cleaned.len(),
            "cleaned raw records"
        );
        cleaned
    }
}
