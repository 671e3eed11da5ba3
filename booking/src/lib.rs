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

//! REST service to manage the passengers, fleet, routes and bookings of a transit operator.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{info, warn};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use transit_core::clocks::SystemClock;
use transit_core::db::Db;

pub mod config;
use config::Config;
pub mod db;
pub mod driver;
use driver::TransitDriver;
pub mod model;
mod rest;
use rest::app;

/// Waits until the process is asked to terminate.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Runs the service on top of `db` until the process is asked to terminate.
async fn run(config: &Config, db: Arc<dyn Db + Send + Sync>) -> Result<(), Box<dyn Error>> {
    db::init_schema(&mut db.ex().await?).await?;
    info!("Database schema initialized");

    if config.api_token.is_none() {
        warn!("No API token configured; the API is open to everyone");
    }
    let driver = TransitDriver::new(db, Arc::new(SystemClock::default()));
    let app = app(driver, config.api_token.clone());

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Instantiates all resources to serve the application as described by `config`.
///
/// The `db` is initialized with the service's schema before accepting any requests and is
/// closed once the server terminates, even if it fails to start.
pub async fn serve(config: Config, db: Arc<dyn Db + Send + Sync>) -> Result<(), Box<dyn Error>> {
    let result = run(&config, db.clone()).await;
    db.close().await;
    result
}
