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

//! Test utilities for the business layer.

use crate::db::init_schema;
use crate::driver::TransitDriver;
use std::sync::Arc;
use time::macros::datetime;
use transit_core::clocks::testutils::MonotonicClock;
use transit_core::db::{Db, Executor};

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: TransitDriver,
}

impl TestContext {
    /// Initializes a driver backed by an in-memory database and a clock that ticks one second
    /// every time it is queried.
    pub(crate) async fn setup() -> Self {
        let db = transit_core::db::sqlite::testutils::setup().await;
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let db: Arc<dyn Db + Send + Sync> = Arc::new(db);

        let clock = Arc::new(MonotonicClock::new(datetime!(2023-11-14 22:13:20 UTC)));
        let driver = TransitDriver::new(db.clone(), clock);

        Self { db, driver }
    }

    /// Returns a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Returns a copy of the driver under test.
    pub(crate) fn driver(&self) -> TransitDriver {
        self.driver.clone()
    }
}
