//! Base implementation of records.
use crate::error::MyoError;
use chrono::prelude::{DateTime, Local};
use std::{
    collections::{
        hash_map::{IntoIter, Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Possible types of values in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A scalar, e.g. a loss or an episode return.
    Scalar(f32),

    /// A timestamp.
    DateTime(DateTime<Local>),

    /// A one-dimensional array, e.g. an action vector.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

/// A set of named values, one per key.
///
/// Produced once per episode or update round and handed to a
/// [`Recorder`](crate::record::Recorder).
#[derive(Debug, Clone)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record with a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns the keys of the record.
    pub fn keys(&self) -> Keys<'_, String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Iterates over key-value pairs.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Consumes the record and iterates over key-value pairs.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets the value for the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges records, the entries of `other` taking precedence.
    pub fn merge(self, other: Record) -> Self {
        Record(self.0.into_iter().chain(other.0).collect())
    }

    /// Gets a scalar value for the given key.
    pub fn get_scalar(&self, k: &str) -> Result<f32, MyoError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(MyoError::RecordValueTypeError(k.into())),
            None => Err(MyoError::RecordKeyError(k.into())),
        }
    }

    /// Returns whether the record holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
