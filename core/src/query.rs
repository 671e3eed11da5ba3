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

//! Parsing of list queries and computation of pagination metadata.
//!
//! List endpoints accept a flat set of query parameters.  `page`, `per_page`, `sort_by` and
//! `sort_direction` control pagination and ordering, and every other key names a filterable field
//! of the listed entity.  Text fields in partial mode match substrings, fields in range mode
//! accept `lo..hi`, `lo..` and `..hi` in addition to plain values, and everything else matches
//! exactly.

use crate::model::FieldErrors;
use crate::schema::{Field, FilterMode, Kind, Value};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Page returned when the client does not ask for one.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u64 = 5;

/// Largest page size a client may ask for.
pub const MAX_PER_PAGE: u64 = 100;

/// Separator between the bounds of a range filter.
const RANGE_SEPARATOR: &str = "..";

/// Matching condition for a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// The field must be equal to the value.
    Equals(Value),

    /// The text field must contain the value as a case-sensitive substring.
    Contains(String),

    /// The field must fall within the inclusive bounds.  A missing bound is unconstrained but at
    /// least one bound is always present.
    Between(Option<Value>, Option<Value>),
}

/// A filter on one field.
#[derive(Clone, Constructor, Debug, PartialEq)]
pub struct Filter {
    /// Name of the field to filter on.
    pub field: &'static str,

    /// Condition the field has to satisfy.
    pub condition: Condition,
}

/// Ordering of list results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    /// Smallest values first.
    #[default]
    Asc,

    /// Largest values first.
    Desc,
}

impl SortDirection {
    /// Returns the SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Validated parameters of a list request.
#[derive(Clone, Debug, Getters, PartialEq)]
pub struct Parameters {
    /// Filters to apply, all of which must match.
    filters: Vec<Filter>,

    /// Field to sort by, or `None` to sort by creation order only.
    sort_by: Option<&'static str>,

    /// Direction of the sort, which also applies to the creation order tie-breakers.
    sort_direction: SortDirection,

    /// 1-based page number to return.
    page: u64,

    /// Maximum number of items per page.
    per_page: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            filters: vec![],
            sort_by: None,
            sort_direction: SortDirection::Asc,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Parses a positive page or page size.
fn parse_positive(raw: &str) -> Result<u64, String> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer".to_owned()),
    }
}

/// Parses a filter on `field` given the `raw` value from the query string.
fn parse_condition(field: &Field, mode: FilterMode, raw: &str) -> Result<Condition, String> {
    match mode {
        FilterMode::Partial if field.kind == Kind::Text => {
            Value::parse(field.kind, raw).map(|_| Condition::Contains(raw.to_owned()))
        }
        FilterMode::Range => match raw.split_once(RANGE_SEPARATOR) {
            Some((lo, hi)) => {
                let bound = |s: &str| {
                    if s.is_empty() { Ok(None) } else { Value::parse(field.kind, s).map(Some) }
                };
                match (bound(lo)?, bound(hi)?) {
                    (None, None) => Err("range needs at least one bound".to_owned()),
                    (lo, hi) => Ok(Condition::Between(lo, hi)),
                }
            }
            None => Value::parse(field.kind, raw).map(Condition::Equals),
        },
        _ => Value::parse(field.kind, raw).map(Condition::Equals),
    }
}

impl Parameters {
    /// Creates parameters that only select a page.
    pub fn with_page(page: u64, per_page: u64) -> Self {
        Self { page, per_page, ..Default::default() }
    }

    /// Parses the key/value `pairs` of a query string for an entity with the given `fields`.
    ///
    /// Every problem is reported in the returned errors, keyed by the offending parameter.
    pub fn parse<I, K, V>(pairs: I, fields: &'static [Field]) -> Result<Self, FieldErrors>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Parameters::default();
        let mut errors = FieldErrors::default();
        let mut seen = BTreeSet::new();
        let filterable =
            move |name: &str| fields.iter().find(|f| f.name == name && f.filter.is_some());

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if !seen.insert(key.to_owned()) {
                errors.add(key, "parameter given more than once");
                continue;
            }

            match key {
                "page" => match parse_positive(value) {
                    Ok(page) => params.page = page,
                    Err(e) => errors.add(key, e),
                },
                "per_page" => match parse_positive(value) {
                    Ok(per_page) if per_page > MAX_PER_PAGE => {
                        errors.add(key, format!("must not exceed {}", MAX_PER_PAGE))
                    }
                    Ok(per_page) => params.per_page = per_page,
                    Err(e) => errors.add(key, e),
                },
                "sort_by" => match filterable(value) {
                    Some(field) => params.sort_by = Some(field.name),
                    None => errors.add(key, format!("field {} is not sortable", value)),
                },
                "sort_direction" => match value {
                    "asc" => params.sort_direction = SortDirection::Asc,
                    "desc" => params.sort_direction = SortDirection::Desc,
                    _ => errors.add(key, "must be asc or desc"),
                },
                _ => match filterable(key) {
                    Some(field) => {
                        let mode = field.filter.unwrap_or(FilterMode::Exact);
                        match parse_condition(field, mode, value) {
                            Ok(cond) => params.filters.push(Filter::new(field.name, cond)),
                            Err(e) => errors.add(key, e),
                        }
                    }
                    None => errors.add(key, "field is not filterable"),
                },
            }
        }

        errors.into_result(params)
    }

    /// Parses a raw URL query string, as in `name=foo&page=2`.  A missing query yields the
    /// default parameters.
    pub fn from_query(query: Option<&str>, fields: &'static [Field]) -> Result<Self, FieldErrors> {
        let query = query.unwrap_or("");
        Parameters::parse(url::form_urlencoded::parse(query.as_bytes()), fields)
    }

    /// Number of items to skip to reach the requested page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Pagination metadata of a list response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Meta {
    /// Requested page.
    pub page: u64,

    /// Requested page size.
    pub per_page: u64,

    /// Number of items that matched the filters before paginating.
    pub total: u64,

    /// Number of pages needed to return all matching items.
    pub total_pages: u64,
}

impl Meta {
    /// Computes the metadata for a query with `params` that matched `total` items.
    ///
    /// The requested page is echoed as is even if it is past the last page.
    pub fn new(params: &Parameters, total: u64) -> Self {
        let total_pages = if params.per_page == 0 { 0 } else { total.div_ceil(params.per_page) };
        Self { page: params.page, per_page: params.per_page, total, total_pages }
    }
}
