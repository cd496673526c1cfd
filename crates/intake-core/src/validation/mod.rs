//! Schema-driven validation of raw form values.
//!
//! A form's value tree is a flat map from field name to [`FieldValue`]. A
//! [`Schema`] turns that tree into a typed value or a field-indexed set of
//! [`ValidationErrors`]. Invalid input is never a panic.

mod appointment;
mod checker;
pub mod fields;
mod patient;

pub use appointment::*;
pub use patient::*;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::FileAttachment;

/// A single value in a form's value tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Files(Vec<FileAttachment>),
}

impl FieldValue {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Empty values and blank text count as unset.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Files(files) => files.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl From<Vec<FileAttachment>> for FieldValue {
    fn from(files: Vec<FileAttachment>) -> Self {
        FieldValue::Files(files)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map(FieldValue::Text).unwrap_or(FieldValue::Empty)
    }
}

/// Raw value tree: field name to value.
pub type RawValues = BTreeMap<String, FieldValue>;

/// Build a [`RawValues`] from `(name, value)` pairs.
pub fn raw_values<I, K, V>(pairs: I) -> RawValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Field-indexed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// All messages for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message for a field, the one shown inline.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A validation schema for one form.
pub trait Schema {
    /// Typed value produced on success.
    type Output;

    /// Validate a raw value tree.
    fn validate(&self, values: &RawValues) -> Result<Self::Output, ValidationErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_keep_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required");
        errors.add("name", "second");
        errors.add("email", "Invalid email address");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first("name"), Some("Name is required"));
        assert_eq!(errors.get("email").len(), 1);
        assert!(errors.get("phone").is_empty());
        assert_eq!(
            errors.to_string(),
            "email: Invalid email address; name: Name is required; name: second"
        );
    }

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Empty.is_blank());
        assert!(FieldValue::from("   ").is_blank());
        assert!(FieldValue::Files(vec![]).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
        assert!(!FieldValue::from("x").is_blank());
    }
}
