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

//! API to unlink members from the owner of an association.

use crate::driver::TransitDriver;
use crate::rest::members_add::parse_body;
use axum::Extension;
use axum::extract::State;
use transit_core::rest::{Envelope, JsonBody, RestResult};
use transit_core::schema::{Association, Entity, Stored};

/// API handler.
pub(crate) async fn handler<E: Entity>(
    State(driver): State<TransitDriver>,
    Extension(association): Extension<&'static Association>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> RestResult<Envelope<Stored<E>>> {
    let (owner, members) = parse_body(association, &body)?;
    let stored = driver.remove_members::<E>(association, owner, members).await?;
    Ok(Envelope::ok(stored))
}
