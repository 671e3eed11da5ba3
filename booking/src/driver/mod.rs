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

//! Business logic for the service.

use std::sync::Arc;
use transit_core::clocks::Clock;
use transit_core::db::{Db, DbError};
use transit_core::driver::DriverError;
use transit_core::schema::Entity;
use uuid::Uuid;

mod entities;
mod members;
#[cfg(test)]
pub(crate) mod testutils;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub struct TransitDriver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock used to timestamp writes.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TransitDriver {
    /// Creates a new driver backed by the given injected components.
    pub fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }
}

/// Translates a database error `e` raised while operating on an entity of type `E`, naming the
/// entity (and its `uuid`, if known) in the messages that reach the client.
fn entity_error<E: Entity>(uuid: Option<Uuid>, e: DbError) -> DriverError {
    let title = E::schema().title;
    match (e, uuid) {
        (DbError::NotFound, Some(uuid)) => {
            DriverError::NotFound(format!("{} {} not found", title, uuid))
        }
        (DbError::AlreadyExists, _) => {
            DriverError::AlreadyExists(format!("{} already exists", title))
        }
        (e, _) => DriverError::from(e),
    }
}
