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

//! Entry point to the booking service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::info;
use std::sync::Arc;
use transit_booking::config::Config;
use transit_booking::serve;
use transit_core::db::postgres::{PostgresDb, PostgresOptions};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env("TRANSIT").expect("Invalid server configuration");
    info!("Starting with {:?}", config);

    let db_opts = PostgresOptions::from_env("PGSQL_PROD").expect("Invalid database configuration");
    info!("Connecting to PostgreSQL at {}:{}", db_opts.host, db_opts.port);
    let db = PostgresDb::connect(db_opts).expect("Cannot create the database pool");

    serve(config, Arc::new(db)).await.expect("Server failed")
}
