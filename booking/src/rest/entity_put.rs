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

//! API to replace the contents of an entity.

use crate::driver::TransitDriver;
use axum::extract::State;
use transit_core::rest::{Envelope, JsonBody, RestResult, UuidPath};
use transit_core::schema::{Entity, Stored};

/// API handler.
pub(crate) async fn handler<E: Entity>(
    State(driver): State<TransitDriver>,
    UuidPath(uuid): UuidPath,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> RestResult<Envelope<Stored<E>>> {
    let entity = E::from_json(&body)?;
    let stored = driver.update(uuid, entity).await?;
    Ok(Envelope::ok(stored))
}
