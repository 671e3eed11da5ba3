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

//! Entry point to the REST server.
//!
//! Every entity gets the same five CRUD routes under `/api/v1/external`, named after its schema,
//! plus a pair of `_add`/`_del` routes per association it owns.

use crate::driver::TransitDriver;
use crate::model::*;
use axum::extract::OriginalUri;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::sync::Arc;
use transit_core::rest::RestError;
use transit_core::schema::Entity;

mod auth;
mod entities_get;
mod entity_delete;
mod entity_get;
mod entity_post;
mod entity_put;
mod health_get;
mod members_add;
mod members_del;
#[cfg(test)]
mod testutils;

/// Base path of all entity APIs.
pub(crate) const BASE_PATH: &str = "/api/v1/external";

/// Adds the routes that manage entities of type `E` to `router`.
fn entity_routes<E: Entity>(mut router: Router<TransitDriver>) -> Router<TransitDriver> {
    let schema = E::schema();

    router = router
        .route(
            &format!("/{}", schema.plural),
            get(entities_get::handler::<E>).fallback(method_not_allowed),
        )
        .route(
            &format!("/{}", schema.name),
            post(entity_post::handler::<E>).fallback(method_not_allowed),
        )
        .route(
            &format!("/{}/:uuid", schema.name),
            get(entity_get::handler::<E>)
                .put(entity_put::handler::<E>)
                .delete(entity_delete::handler::<E>)
                .fallback(method_not_allowed),
        );

    for association in schema.associations {
        let member = association.member.name;
        router = router
            .route(
                &format!("/{}/{}_add", schema.name, member),
                post(members_add::handler::<E>)
                    .fallback(method_not_allowed)
                    .layer(Extension(association)),
            )
            .route(
                &format!("/{}/{}_del", schema.name, member),
                post(members_del::handler::<E>)
                    .fallback(method_not_allowed)
                    .layer(Extension(association)),
            );
    }

    router
}

/// Handler for requests that do not match any route.
async fn fallback(OriginalUri(uri): OriginalUri) -> RestError {
    RestError::NotFound(format!("No route for {}", uri.path()))
}

/// Handler for requests to a known route with a method the route does not accept.
async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> RestError {
    RestError::MethodNotAllowed(format!("Method {} not allowed for {}", method, uri.path()))
}

/// Creates the router for the application.
///
/// If `api_token` is set, all entity APIs require it as a bearer token.
pub fn app(driver: TransitDriver, api_token: Option<String>) -> Router {
    let mut api = Router::new();
    api = entity_routes::<Country>(api);
    api = entity_routes::<City>(api);
    api = entity_routes::<DocumentType>(api);
    api = entity_routes::<PassengerType>(api);
    api = entity_routes::<OrderStatusType>(api);
    api = entity_routes::<RegularityType>(api);
    api = entity_routes::<Vehicle>(api);
    api = entity_routes::<Driver>(api);
    api = entity_routes::<Price>(api);
    api = entity_routes::<Route>(api);
    api = entity_routes::<Trip>(api);
    api = entity_routes::<Passenger>(api);
    api = entity_routes::<Order>(api);
    api = entity_routes::<Payment>(api);

    if let Some(token) = api_token {
        api = api.route_layer(axum::middleware::from_fn_with_state(
            Arc::new(token),
            auth::require_bearer_token,
        ));
    }

    Router::new()
        .nest(BASE_PATH, api)
        .route("/health", get(health_get::handler).fallback(method_not_allowed))
        .fallback(fallback)
        .with_state(driver)
}
