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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::TransitDriver;
use crate::rest::app;
use axum::Router;
use std::sync::Arc;
use time::macros::datetime;
use transit_core::clocks::Clock;
use transit_core::clocks::testutils::MonotonicClock;
use transit_core::db::{Db, DbResult};
use transit_core::schema::{Entity, Stored};
use uuid::Uuid;

/// Token required by apps created with `TestContext::setup_with_token`.
pub(crate) const TEST_TOKEN: &str = "s3cr3t";

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<MonotonicClock>,
    app: Router,
}

impl TestContext {
    async fn setup_internal(api_token: Option<String>) -> Self {
        let db = transit_core::db::sqlite::testutils::setup().await;
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let db: Arc<dyn Db + Send + Sync> = Arc::new(db);

        let clock = Arc::new(MonotonicClock::new(datetime!(2024-02-03 10:00:00 UTC)));
        let driver = TransitDriver::new(db.clone(), clock.clone());
        let app = app(driver, api_token);
        Self { db, clock, app }
    }

    /// Sets up an app that does not require authentication.
    pub(crate) async fn setup() -> Self {
        Self::setup_internal(None).await
    }

    /// Sets up an app that requires `TEST_TOKEN` as a bearer token.
    pub(crate) async fn setup_with_token() -> Self {
        Self::setup_internal(Some(TEST_TOKEN.to_owned())).await
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Stores `entity` directly in the database, bypassing the REST layer.
    pub(crate) async fn create<E: Entity>(&self, entity: E) -> Stored<E> {
        let now = self.clock.now_utc();
        db::save(&mut self.db.ex().await.unwrap(), None, &entity, now).await.unwrap()
    }

    /// Fetches the live entity `uuid` directly from the database.
    pub(crate) async fn get<E: Entity>(&self, uuid: Uuid) -> DbResult<Stored<E>> {
        db::get(&mut self.db.ex().await.unwrap(), uuid).await
    }
}
