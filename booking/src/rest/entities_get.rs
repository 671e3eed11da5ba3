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

//! API to list the entities of a type with filtering, sorting and pagination.

use crate::driver::TransitDriver;
use axum::extract::{RawQuery, State};
use transit_core::query::Parameters;
use transit_core::rest::{EmptyBody, Envelope, RestResult};
use transit_core::schema::{Entity, Stored};

/// API handler.
pub(crate) async fn handler<E: Entity>(
    State(driver): State<TransitDriver>,
    RawQuery(query): RawQuery,
    _: EmptyBody,
) -> RestResult<Envelope<Vec<Stored<E>>>> {
    let params = Parameters::from_query(query.as_deref(), E::schema().fields)?;
    let (entities, meta) = driver.list::<E>(params).await?;
    Ok(Envelope::ok(entities).with_meta(meta))
}
