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

//! API to link members to the owner of an association.

use crate::driver::TransitDriver;
use axum::Extension;
use axum::extract::State;
use transit_core::model::FieldErrors;
use transit_core::rest::{Envelope, JsonBody, RestResult};
use transit_core::schema::{Association, Entity, Kind, Stored, Value};
use uuid::Uuid;

/// Parses a single UUID given as a JSON string.
fn parse_uuid(raw: Option<&serde_json::Value>) -> Result<Uuid, String> {
    match raw {
        None | Some(serde_json::Value::Null) => Err("is required".to_owned()),
        Some(raw) => match Value::from_json(Kind::Uuid, raw)? {
            Value::Uuid(uuid) => Ok(uuid),
            _ => Err("must be a valid UUID".to_owned()),
        },
    }
}

/// Parses the body of the association APIs, which looks like
/// `{"uuid": "<owner>", "<collection>": [{"uuid": "<member>"}, ...]}`.
///
/// Returns the owner and the members in the order given.
pub(super) fn parse_body(
    association: &Association,
    body: &serde_json::Value,
) -> Result<(Uuid, Vec<Uuid>), FieldErrors> {
    let mut errors = FieldErrors::default();
    let Some(object) = body.as_object() else {
        errors.add("body", "must be a JSON object");
        return Err(errors);
    };

    let owner = match parse_uuid(object.get("uuid")) {
        Ok(owner) => Some(owner),
        Err(e) => {
            errors.add("uuid", e);
            None
        }
    };

    let mut members = vec![];
    match object.get(association.name) {
        Some(serde_json::Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                match parse_uuid(item.get("uuid")) {
                    Ok(member) => members.push(member),
                    Err(e) => errors.add(association.name, format!("item {}: uuid {}", i, e)),
                }
            }
        }
        None => errors.add(association.name, "is required"),
        Some(_) => errors.add(association.name, "must be an array"),
    }

    match owner {
        Some(owner) if errors.is_empty() => Ok((owner, members)),
        _ => Err(errors),
    }
}

/// API handler.
pub(crate) async fn handler<E: Entity>(
    State(driver): State<TransitDriver>,
    Extension(association): Extension<&'static Association>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> RestResult<Envelope<Stored<E>>> {
    let (owner, members) = parse_body(association, &body)?;
    let stored = driver.add_members::<E>(association, owner, members).await?;
    Ok(Envelope::ok(stored))
}
