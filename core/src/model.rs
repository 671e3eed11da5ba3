// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic data types shared by all layers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Errors caused by invalid data in a model type.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Collection of validation errors keyed by the name of the offending field or parameter.
///
/// Only the first error reported for a given field is kept.  Validation code is expected to
/// report everything it finds instead of stopping at the first problem so that clients get the
/// full picture in a single round trip.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records that `field` is invalid because of `message`.
    pub fn add<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Moves all errors in `other` into this collection.
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    /// Returns true if no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of invalid fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the error recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns `value` if there are no errors, or the errors themselves otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid fields: ")?;
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", field, message)?;
        }
        Ok(())
    }
}

impl<F, M, const N: usize> From<[(F, M); N]> for FieldErrors
where
    F: Into<String>,
    M: Into<String>,
{
    fn from(errors: [(F, M); N]) -> Self {
        let mut result = FieldErrors::default();
        for (field, message) in errors {
            result.add(field, message);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_keeps_first() {
        let mut errors = FieldErrors::default();
        assert!(errors.is_empty());
        errors.add("name", "is required");
        errors.add("name", "is too long");
        errors.add("code", "must contain only letters");
        assert_eq!(2, errors.len());
        assert_eq!(Some("is required"), errors.get("name"));
        assert_eq!(Some("must contain only letters"), errors.get("code"));
        assert_eq!(None, errors.get("other"));
    }

    #[test]
    fn test_field_errors_extend() {
        let mut errors = FieldErrors::from([("a", "first")]);
        errors.extend(FieldErrors::from([("a", "second"), ("b", "third")]));
        assert_eq!(FieldErrors::from([("a", "first"), ("b", "third")]), errors);
    }

    #[test]
    fn test_field_errors_into_result() {
        assert_eq!(Ok(3), FieldErrors::default().into_result(3));
        let errors = FieldErrors::from([("x", "bad")]);
        assert_eq!(Err(errors.clone()), errors.into_result(3));
    }

    #[test]
    fn test_field_errors_display() {
        let errors = FieldErrors::from([("name", "is required"), ("code", "is too long")]);
        assert_eq!("Invalid fields: code is too long; name is required", errors.to_string());
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let errors = FieldErrors::from([("bogus_field", "field is not filterable")]);
        assert_eq!(
            serde_json::json!({"bogus_field": "field is not filterable"}),
            serde_json::to_value(&errors).unwrap()
        );
    }
}
