//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when one or more fields of an input are rejected
//!   (length, format, uniqueness). It carries the messages keyed by field.
//! - [`KeyNotFound`] thrown when an item are not found.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use std::{collections::BTreeMap, fmt};

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Field level validation messages, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Turn the collected messages into a result: `Ok` when nothing was
    /// reported.
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self))
        }
    }

    pub(crate) fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Messages for a single field, when this is a validation error.
    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        match self {
            Self::Validation(errors) => errors.get(field),
            _ => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn field_errors_display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");
        errors.add("status", "Ensure this value has at most 50 characters (it has 51).");
        assert_eq!(
            errors.to_string(),
            "status: Ensure this value has at most 50 characters (it has 51).; \
             title: This field is required."
        );
    }

    #[test]
    fn field_errors_lookup_through_engine_error() {
        let err = EngineError::Validation(FieldErrors::single("phone", "bad"));
        assert_eq!(err.field_errors("phone"), Some(&["bad".to_string()][..]));
        assert_eq!(err.field_errors("title"), None);
    }
}
