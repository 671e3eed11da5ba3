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

//! API to create an entity.

use crate::driver::TransitDriver;
use axum::extract::State;
use transit_core::model::FieldErrors;
use transit_core::rest::{Envelope, JsonBody, RestResult};
use transit_core::schema::{Entity, Kind, Stored, Value};
use uuid::Uuid;

/// Extracts the optional client-supplied identifier from the `body`.
fn parse_uuid(body: &serde_json::Value, errors: &mut FieldErrors) -> Option<Uuid> {
    match body.get("uuid") {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => match Value::from_json(Kind::Uuid, raw) {
            Ok(Value::Uuid(uuid)) => Some(uuid),
            Ok(_) => None,
            Err(e) => {
                errors.add("uuid", e);
                None
            }
        },
    }
}

/// API handler.
pub(crate) async fn handler<E: Entity>(
    State(driver): State<TransitDriver>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> RestResult<Envelope<Stored<E>>> {
    let mut errors = FieldErrors::default();
    let uuid = parse_uuid(&body, &mut errors);
    let entity = match E::from_json(&body) {
        Ok(entity) => Some(entity),
        Err(e) => {
            errors.extend(e);
            None
        }
    };

    match entity {
        Some(entity) if errors.is_empty() => {
            let stored = driver.create(uuid, entity).await?;
            Ok(Envelope::created(stored))
        }
        _ => Err(errors.into()),
    }
}
