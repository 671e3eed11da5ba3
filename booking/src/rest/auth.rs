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

//! Bearer token gate for the entity APIs.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;
use std::sync::Arc;
use transit_core::rest::{RestError, get_bearer_auth};

/// Authentication realm announced in `WWW-Authenticate`.
const REALM: &str = "transit";

/// Compares `given` against `expected` in time that only depends on their lengths.
fn token_matches(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Middleware that only lets requests carrying `token` as their bearer token through.
pub(crate) async fn require_bearer_token(
    State(token): State<Arc<String>>,
    request: Request,
    next: Next,
) -> Response {
    match get_bearer_auth(request.headers(), REALM) {
        Ok(given) if token_matches(given, &token) => next.run(request).await,
        Ok(_) => {
            warn!("Rejected {} {}: invalid token", request.method(), request.uri().path());
            RestError::Unauthorized {
                scheme: "Bearer",
                realm: REALM,
                message: "Invalid token".to_owned(),
            }
            .into_response()
        }
        Err(e) => {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            e.into_response()
        }
    }
}
