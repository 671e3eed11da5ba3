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

//! Declarative descriptions of entities.
//!
//! Every entity exposed by a service is described by a static `Schema`: the list of its fields
//! with their types, validation rules, filtering modes and relationships.  The persistence and
//! HTTP layers are written once against this description instead of once per entity.
//!
//! Entities themselves are plain serde types that implement `Entity`.  Conversions between an
//! entity and its untyped `Record` go through JSON, which is also the wire format, so the
//! validation applied to client payloads and to stored data is the same.

use crate::model::{FieldErrors, ModelError, ModelResult};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// Storage type of a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Free-form UTF-8 text.
    Text,

    /// A UUID, typically pointing to another entity.
    Uuid,

    /// A signed 64-bit integer.
    Integer,

    /// A double-precision floating point number.
    Real,

    /// A point in time, exchanged as an RFC 3339 string.
    Timestamp,
}

/// How a field can be used to filter list results.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterMode {
    /// The field must match the given value exactly.
    Exact,

    /// The field must contain the given value as a substring.  Only valid for text fields.
    Partial,

    /// The field can be matched exactly or against an inclusive `lo..hi` range.
    Range,
}

/// Validation rule applied to the value of a field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    /// Text must only contain letters, spaces, hyphens and apostrophes.
    Alphabetic,

    /// Text must only contain ASCII digits.
    Digits,

    /// Text must have between `min` and `max` characters, both inclusive.
    Length(usize, usize),

    /// Numbers must be strictly greater than zero.
    Positive,

    /// Numbers must be zero or greater.
    NonNegative,
}

impl Rule {
    /// Checks if `value` satisfies this rule and returns a description of the problem otherwise.
    fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Rule::Alphabetic, Value::Text(s))
                if !s.chars().all(|c| c.is_alphabetic() || " -'".contains(c)) =>
            {
                Err("must contain only letters".to_owned())
            }
            (Rule::Digits, Value::Text(s)) if !s.chars().all(|c| c.is_ascii_digit()) => {
                Err("must contain only digits".to_owned())
            }
            (Rule::Length(min, max), Value::Text(s)) => {
                let length = s.chars().count();
                if length < *min || length > *max {
                    Err(format!("must be between {} and {} characters long", min, max))
                } else {
                    Ok(())
                }
            }
            (Rule::Positive, Value::Integer(i)) if *i <= 0 => Err("must be positive".to_owned()),
            (Rule::Positive, Value::Real(r)) if *r <= 0.0 => Err("must be positive".to_owned()),
            (Rule::NonNegative, Value::Integer(i)) if *i < 0 => {
                Err("must not be negative".to_owned())
            }
            (Rule::NonNegative, Value::Real(r)) if *r < 0.0 => {
                Err("must not be negative".to_owned())
            }
            _ => Ok(()),
        }
    }
}

/// Description of a single field of an entity.
///
/// Fields are meant to be declared in `static` schemas using the `const` builder methods, as in
/// `Field::new("name", Kind::Text).filter(FilterMode::Partial).unique()`.
#[derive(Debug)]
pub struct Field {
    /// Name of the field, used both as the JSON key and as the database column.
    pub name: &'static str,

    /// Storage type of the field.
    pub kind: Kind,

    /// Whether the field must be present and not null.
    pub required: bool,

    /// Filtering mode for list queries, or `None` if the field cannot be filtered on.
    pub filter: Option<FilterMode>,

    /// Validation rules applied to non-null values.
    pub rules: &'static [Rule],

    /// Whether the value must be unique among live rows.
    pub unique: bool,

    /// Entity this field points to, if any.  References are embedded in detail projections.
    pub references: Option<&'static Schema>,
}

impl Field {
    /// Creates a required field with no rules.
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: true,
            filter: None,
            rules: &[],
            unique: false,
            references: None,
        }
    }

    /// Makes the field nullable.
    pub const fn optional(self) -> Self {
        Self { required: false, ..self }
    }

    /// Allows filtering list queries on this field with the given `mode`.
    pub const fn filter(self, mode: FilterMode) -> Self {
        Self { filter: Some(mode), ..self }
    }

    /// Sets the validation rules of the field.
    pub const fn rules(self, rules: &'static [Rule]) -> Self {
        Self { rules, ..self }
    }

    /// Requires the field to be unique among live rows.
    pub const fn unique(self) -> Self {
        Self { unique: true, ..self }
    }

    /// Marks the field as pointing to an entity of the given `schema`.
    pub const fn references(self, schema: &'static Schema) -> Self {
        Self { references: Some(schema), ..self }
    }

    /// Name under which the referenced entity is embedded in detail projections.
    pub fn relation_name(&self) -> &'static str {
        self.name.strip_suffix("_uuid").unwrap_or(self.name)
    }

    /// Converts the raw JSON `json` value of this field into a validated `Value`.
    fn check(&self, json: Option<&serde_json::Value>) -> Result<Value, String> {
        let json = match json {
            None | Some(serde_json::Value::Null) if self.required => {
                return Err("is required".to_owned());
            }
            None | Some(serde_json::Value::Null) => return Ok(Value::Null(self.kind)),
            Some(json) => json,
        };

        let value = Value::from_json(self.kind, json)?;
        if let Value::Text(s) = &value {
            if self.required && s.trim().is_empty() {
                return Err("is required".to_owned());
            }
        }
        for rule in self.rules {
            rule.check(&value)?;
        }
        Ok(value)
    }
}

/// A many-to-many relationship between two entities stored in a join table.
#[derive(Debug)]
pub struct Association {
    /// Name of the collection in payloads and detail projections, such as `vehicles`.
    pub name: &'static str,

    /// Join table holding the pairs.
    pub table: &'static str,

    /// Column of the join table that points to the owner entity.
    pub owner_column: &'static str,

    /// Column of the join table that points to the member entity.
    pub member_column: &'static str,

    /// Schema of the member entities.
    pub member: &'static Schema,
}

/// Description of an entity.
pub struct Schema {
    /// Singular name of the entity, used in single-entity routes.
    pub name: &'static str,

    /// Plural name of the entity, used in collection routes.
    pub plural: &'static str,

    /// Human-readable name of the entity for messages.
    pub title: &'static str,

    /// Table that stores the entity.
    pub table: &'static str,

    /// Domain fields of the entity, excluding the identifier and the timestamps.
    pub fields: &'static [Field],

    /// Many-to-many relationships owned by the entity.
    pub associations: &'static [Association],
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Schema {
    /// Looks up a field by `name`.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates a JSON `body` against the fields of this schema.
    ///
    /// All fields are checked and every problem is reported.  Keys that do not correspond to a
    /// field are ignored.
    pub fn validate(&self, body: &serde_json::Value) -> Result<Record, FieldErrors> {
        let mut errors = FieldErrors::default();
        let object = match body.as_object() {
            Some(object) => object,
            None => {
                errors.add("body", "must be a JSON object");
                return Err(errors);
            }
        };

        let mut record = Record::default();
        for field in self.fields {
            match field.check(object.get(field.name)) {
                Ok(value) => record.insert(field.name, value),
                Err(message) => errors.add(field.name, message),
            }
        }
        errors.into_result(record)
    }
}

/// A typed value of a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Value of a `Kind::Text` field.
    Text(String),

    /// Value of a `Kind::Uuid` field.
    Uuid(Uuid),

    /// Value of a `Kind::Integer` field.
    Integer(i64),

    /// Value of a `Kind::Real` field.
    Real(f64),

    /// Value of a `Kind::Timestamp` field, in UTC with microsecond precision.
    Timestamp(OffsetDateTime),

    /// Null value of a field of the given kind.
    Null(Kind),
}

/// Normalizes a timestamp to UTC and truncates it to microseconds, which is the precision of all
/// our database backends.
fn normalize_timestamp(ts: OffsetDateTime) -> Result<OffsetDateTime, String> {
    let ts = ts.to_offset(UtcOffset::UTC);
    ts.replace_nanosecond(ts.nanosecond() / 1000 * 1000).map_err(|e| e.to_string())
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Text(_) => Kind::Text,
            Value::Uuid(_) => Kind::Uuid,
            Value::Integer(_) => Kind::Integer,
            Value::Real(_) => Kind::Real,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Null(kind) => *kind,
        }
    }

    /// Builds a text value, rejecting NUL characters because databases cannot store them.
    fn text(raw: &str) -> Result<Value, String> {
        if raw.contains('\0') {
            return Err("must not contain NUL characters".to_owned());
        }
        Ok(Value::Text(raw.to_owned()))
    }

    /// Parses a textual `raw` value, as received in a query string, into a value of `kind`.
    pub fn parse(kind: Kind, raw: &str) -> Result<Value, String> {
        match kind {
            Kind::Text => Value::text(raw),
            Kind::Uuid => Uuid::parse_str(raw)
                .map(Value::Uuid)
                .map_err(|_| "must be a valid UUID".to_owned()),
            Kind::Integer => {
                raw.parse::<i64>().map(Value::Integer).map_err(|_| "must be an integer".to_owned())
            }
            Kind::Real => match raw.parse::<f64>() {
                Ok(r) if r.is_finite() => Ok(Value::Real(r)),
                _ => Err("must be a number".to_owned()),
            },
            Kind::Timestamp => match OffsetDateTime::parse(raw, &Rfc3339) {
                Ok(ts) => normalize_timestamp(ts).map(Value::Timestamp),
                Err(_) => Err("must be an RFC 3339 timestamp".to_owned()),
            },
        }
    }

    /// Converts a non-null `json` value, as received in a payload, into a value of `kind`.
    pub fn from_json(kind: Kind, json: &serde_json::Value) -> Result<Value, String> {
        match (kind, json) {
            (Kind::Text, serde_json::Value::String(s)) => Value::text(s),
            (Kind::Text, _) => Err("must be a string".to_owned()),
            (Kind::Integer, json) => {
                json.as_i64().map(Value::Integer).ok_or_else(|| "must be an integer".to_owned())
            }
            (Kind::Real, json) => {
                json.as_f64().map(Value::Real).ok_or_else(|| "must be a number".to_owned())
            }
            (kind, serde_json::Value::String(s)) => Value::parse(kind, s),
            (Kind::Uuid, _) => Err("must be a valid UUID".to_owned()),
            (Kind::Timestamp, _) => Err("must be an RFC 3339 timestamp".to_owned()),
        }
    }

    /// Converts this value into its JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Uuid(u) => serde_json::Value::String(u.to_string()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Real(r) => serde_json::Number::from_f64(*r)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Timestamp(ts) => match ts.format(&Rfc3339) {
                Ok(s) => serde_json::Value::String(s),
                Err(_) => serde_json::Value::Null,
            },
            Value::Null(_) => serde_json::Value::Null,
        }
    }
}

/// Untyped field values of an entity, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record(BTreeMap<&'static str, Value>);

impl Record {
    /// Sets the value of `field`.
    pub fn insert(&mut self, field: &'static str, value: Value) {
        self.0.insert(field, value);
    }

    /// Gets the value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Converts the record into a JSON object.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0.iter().map(|(k, v)| ((*k).to_owned(), v.to_json())).collect()
    }
}

/// Operations common to all entities.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns the schema that describes this entity.
    fn schema() -> &'static Schema;

    /// Validates a client-provided `json` payload and builds the entity from it.
    fn from_json(json: &serde_json::Value) -> Result<Self, FieldErrors> {
        let record = Self::schema().validate(json)?;
        Self::from_record(&record).map_err(|e| FieldErrors::from([("body", e.0)]))
    }

    /// Builds the entity from an already-validated `record`.
    fn from_record(record: &Record) -> ModelResult<Self> {
        serde_json::from_value(serde_json::Value::Object(record.to_json())).map_err(|e| {
            ModelError(format!("Cannot build {} from record: {}", Self::schema().name, e))
        })
    }

    /// Converts the entity into a validated record.
    fn to_record(&self) -> Result<Record, FieldErrors> {
        match serde_json::to_value(self) {
            Ok(json) => Self::schema().validate(&json),
            Err(e) => Err(FieldErrors::from([("body", e.to_string())])),
        }
    }
}

/// An entity as persisted, with its identity, timestamps and eagerly-loaded relations.
///
/// Serializing this type yields the detail projection returned to clients: the entity's fields
/// flattened next to `uuid`, `created_at`, `updated_at` and one key per relation.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct Stored<E> {
    /// Identifier of the entity.
    uuid: Uuid,

    /// When the entity was first stored.
    created_at: OffsetDateTime,

    /// When the entity was last modified.
    updated_at: OffsetDateTime,

    /// The entity itself.
    entity: E,

    /// Referenced entities and association members, keyed by relation name.
    related: BTreeMap<&'static str, serde_json::Value>,
}

impl<E: Entity> Stored<E> {
    /// Builds the detail projection of the entity.
    pub fn detail(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut object = match serde_json::to_value(&self.entity)? {
            serde_json::Value::Object(object) => object,
            _ => {
                return Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                    "{} does not serialize to an object",
                    E::schema().name
                )));
            }
        };
        object.insert("uuid".to_owned(), Value::Uuid(self.uuid).to_json());
        object.insert("created_at".to_owned(), Value::Timestamp(self.created_at).to_json());
        object.insert("updated_at".to_owned(), Value::Timestamp(self.updated_at).to_json());
        for (name, value) in &self.related {
            object.insert((*name).to_owned(), value.clone());
        }
        Ok(serde_json::Value::Object(object))
    }
}

impl<E: Entity> Serialize for Stored<E> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let detail = self.detail().map_err(<S::Error as serde::ser::Error>::custom)?;
        detail.serialize(serializer)
    }
}
