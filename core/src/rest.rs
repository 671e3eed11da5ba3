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

//! Generic code for REST handlers.
//!
//! All services should implement an `app` function in this module that returns the `Router` for the
//! application.
//!
//! Every API should be put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This
//! may seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.
//!
//! More specifically, the `tests` module within an API should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the module
//! then rely on `route` to obtain this information, ensuring that they all test the desired API.
//!
//! Every response, successful or not, is wrapped in an `Envelope` so that clients can always
//! find the status `code`, a human-readable `message`, the `data` and, for lists, the pagination
//! `meta`.

use crate::driver::DriverError;
use crate::model::FieldErrors;
use crate::query::Meta;
use async_trait::async_trait;
use axum::Json;
use axum::body::HttpBody;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::AsHeaderName;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use log::error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Indicates a malformed request, such as an invalid identifier in the path.
    #[error("{0}")]
    BadRequest(String),

    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates that the requested path exists but does not accept the request's method.
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,

    /// Indicates an authentication problem.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Expected authorization scheme.
        scheme: &'static str,

        /// Expected authorization realm.
        realm: &'static str,

        /// Descriptive message explaining the nature of the problem.
        message: String,
    },

    /// Indicates that the content of the request is well-formed but fails validation.
    #[error("{message}")]
    UnprocessableEntity {
        /// Summary of the problem.
        message: String,

        /// Per-field details of the problem, which may be empty.
        errors: FieldErrors,
    },
}

impl RestError {
    /// Creates an `UnprocessableEntity` error with a `message` and no field details.
    pub fn unprocessable<S: Into<String>>(message: S) -> Self {
        RestError::UnprocessableEntity { message: message.into(), errors: FieldErrors::default() }
    }
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::AlreadyExists(message) => RestError::unprocessable(message),
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::InvalidInput(errors) => errors.into(),
            DriverError::NotFound(message) => RestError::NotFound(message),
        }
    }
}

impl From<FieldErrors> for RestError {
    fn from(errors: FieldErrors) -> Self {
        RestError::UnprocessableEntity { message: "Validation failed".to_owned(), errors }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(e: serde_json::Error) -> Self {
        RestError::InternalError(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status;
        let mut headers = HeaderMap::new();
        let mut data = serde_json::Value::Null;
        let mut message = self.to_string();
        match self {
            RestError::BadRequest(_) => {
                status = StatusCode::BAD_REQUEST;
            }
            RestError::InternalError(detail) => {
                status = StatusCode::INTERNAL_SERVER_ERROR;
                error!("Internal error: {}", detail);
                message = "Internal server error".to_owned();
            }
            RestError::MethodNotAllowed(_) => {
                status = StatusCode::METHOD_NOT_ALLOWED;
            }
            RestError::NotFound(_) => {
                status = StatusCode::NOT_FOUND;
            }
            RestError::PayloadNotEmpty => {
                status = StatusCode::PAYLOAD_TOO_LARGE;
            }
            RestError::Unauthorized { scheme, realm, message: _ } => {
                status = StatusCode::UNAUTHORIZED;
                if let Ok(value) = format!("{} realm=\"{}\"", scheme, realm).parse() {
                    headers.insert("WWW-Authenticate", value);
                }
            }
            RestError::UnprocessableEntity { message: _, errors } => {
                status = StatusCode::UNPROCESSABLE_ENTITY;
                if !errors.is_empty() {
                    data = serde_json::to_value(errors).unwrap_or(serde_json::Value::Null);
                }
            }
        };

        let response = Envelope { code: status.as_u16(), message, data, meta: None };

        (status, headers, Json(response)).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Wrapper for all response payloads.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct Envelope<T> {
    /// HTTP status code of the response.
    pub code: u16,

    /// Human-readable summary of the result.
    pub message: String,

    /// The payload itself, which is `null` for responses without content.
    pub data: T,

    /// Pagination details, only present in list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> Envelope<T> {
    /// Creates a successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self { code: StatusCode::OK.as_u16(), message: "OK".to_owned(), data, meta: None }
    }

    /// Creates a response for a newly-created entity.
    pub fn created(data: T) -> Self {
        Self { code: StatusCode::CREATED.as_u16(), message: "Created".to_owned(), data, meta: None }
    }

    /// Attaches pagination details to the response.
    pub fn with_meta(self, meta: Meta) -> Self {
        Self { meta: Some(meta), ..self }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.  This future-proofs the service.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// A request body extractor for JSON payloads that reports problems as `RestError`s.
///
/// Unlike `axum::Json`, a missing content type or a malformed document is rejected with a 422
/// wrapped in an `Envelope`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(RestError::unprocessable(rejection.body_text())),
        }
    }
}

/// A path extractor for routes with a single UUID parameter.
pub struct UuidPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::BadRequest(e.body_text()))?;
        match Uuid::parse_str(&raw) {
            Ok(uuid) => Ok(UuidPath(uuid)),
            Err(_) => Err(RestError::BadRequest(format!("Invalid UUID {}", raw))),
        }
    }
}

/// Extracts the header `name` from `headers` and ensures it has at most one value.
pub fn get_unique_header<K: AsHeaderName + Copy>(
    headers: &HeaderMap,
    name: K,
) -> RestResult<Option<&HeaderValue>> {
    let mut iter = headers.get_all(name).iter();
    let value = iter.next();
    if iter.next().is_some() {
        return Err(RestError::BadRequest(format!(
            "Header {} cannot have more than one value",
            name.as_str()
        )));
    }
    Ok(value)
}

/// Assumes that the `headers` contain a bearer token for `exp_realm` and extracts it.
pub fn get_bearer_auth<'a>(headers: &'a HeaderMap, exp_realm: &'static str) -> RestResult<&'a str> {
    let unauthorized =
        |message: String| RestError::Unauthorized { scheme: "Bearer", realm: exp_realm, message };

    let authz = match get_unique_header(headers, "Authorization") {
        Ok(Some(value)) => value,
        Ok(None) => return Err(unauthorized("Missing Authorization header".to_owned())),
        Err(e) => return Err(unauthorized(e.to_string())),
    };

    let authz = authz
        .to_str()
        .map_err(|e| unauthorized(format!("Bad encoding in Authorization header: {}", e)))?;

    let mut fields = authz.splitn(2, ' ');
    let scheme = match fields.next() {
        Some(s) if !s.is_empty() => s,
        _ => return Err(unauthorized("Bad Authorization header: missing scheme".to_owned())),
    };
    let token = match fields.next() {
        Some(s) if !s.is_empty() => s,
        _ => return Err(unauthorized("Bad Authorization header: missing payload".to_owned())),
    };

    if scheme != "Bearer" {
        return Err(unauthorized("Unsupported scheme".to_owned()));
    }

    Ok(token)
}

/// Common test code for the REST server.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::*;
    use axum::Router;
    use axum::http::{self, HeaderName};
    use serde::Serialize;
    use std::fmt;
    use tower::util::ServiceExt;

    /// Maximum body size for testing purposes.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a single request to the API server.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router for the app being tested.
        app: Router,

        /// Builder for the request that will be sent to the app.
        builder: axum::http::request::Builder,
    }

    impl OneShotBuilder {
        /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Extends the URI in the request with a `query`.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            let uri = self.builder.uri_ref().unwrap().to_string();
            assert!(!uri.contains('?'), "URI already contains a query: {}", uri);
            self.builder = self.builder.uri(format!(
                "{}?{}",
                uri,
                serde_urlencoded::to_string(query).unwrap()
            ));
            self
        }

        /// Adds bearer authentication to the request.
        pub fn with_bearer_auth<T>(mut self, token: T) -> Self
        where
            T: fmt::Display,
        {
            let value = format!("Bearer {}", token);
            self.builder = self.builder.header(http::header::AUTHORIZATION, value);
            self
        }

        /// Sets the header `name` to `value` in the outgoing request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            self.builder = self.builder.header(name, value);
            self
        }

        /// Finishes building the request and sends it with an empty payload.
        pub async fn send_empty(self) -> ResponseChecker {
            let request = self.builder.body(axum::body::Body::empty()).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a text payload.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
                .body(axum::body::Body::from(text.into()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a JSON payload.
        pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }
    }

    /// Type alias for the response returned by the `oneshot` function.
    type HttpResponse = axum::response::Response;

    /// Validator for the outcome of a request sent by a `OneShotBuilder`.
    #[must_use]
    pub struct ResponseChecker {
        /// Actual response that we received from the app.
        response: HttpResponse,

        /// Expected HTTP status code in the response above.
        exp_status: http::StatusCode,
    }

    impl From<HttpResponse> for ResponseChecker {
        fn from(response: HttpResponse) -> Self {
            Self { response, exp_status: http::StatusCode::OK }
        }
    }

    impl ResponseChecker {
        /// Sets the expected exit HTTP status to `status`.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Performs common validation operations on the response.
        pub fn verify(&self) {
            assert_eq!(self.exp_status, self.response.status());
        }

        /// Reads the whole body of the response.
        async fn take_body(self) -> axum::body::Bytes {
            axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap()
        }

        /// Finishes checking the response and expects its body to be an error `Envelope` whose
        /// message matches `exp_re`.  Returns the `data` of the envelope for further checks.
        pub async fn expect_error(self, exp_re: &str) -> serde_json::Value {
            self.verify();
            let exp_code = self.exp_status.as_u16();

            let body = self.take_body().await;
            let response: Envelope<serde_json::Value> = match serde_json::from_slice(&body) {
                Ok(response) => response,
                Err(e) => {
                    let body = String::from_utf8(body.to_vec()).unwrap();
                    panic!("Invalid error response due to {}; content was {}", e, body);
                }
            };
            assert_eq!(exp_code, response.code);
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(
                re.is_match(&response.message),
                "Response content '{:?}' does not match re '{}'",
                response,
                exp_re
            );
            response.data
        }

        /// Finishes checking the response and expects it to be a 422 `Envelope` that carries
        /// field errors.
        pub async fn expect_field_errors(self) -> FieldErrors {
            let data = self
                .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
                .expect_error("Validation failed")
                .await;
            serde_json::from_value(data).unwrap()
        }

        /// Finishes checking the response and expects it to contain a valid JSON object of
        /// type `T`.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            self.verify();

            let body = self.take_body().await;
            serde_json::from_slice::<T>(&body).unwrap()
        }

        /// Finishes checking the response and returns the response itself for out of band
        /// validation of properties not supported by the `ResponseChecker`.
        pub async fn take_response(self) -> HttpResponse {
            self.verify();

            self.response
        }
    }

    /// Generates a test to verify that an API that expects JSON fails when it gets something else.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
                    .expect_error("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
                    .expect_error("expected ident")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Generates a test to verify that an API that does not expect a payload fails as necessary.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("should not be here")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("should be empty")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Converts `response` into its status, headers and decoded envelope.
    async fn decode(
        response: axum::response::Response,
    ) -> (StatusCode, HeaderMap, Envelope<serde_json::Value>) {
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, headers, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_from_driver_error() {
        assert_eq!(
            RestError::NotFound("Country x not found".to_owned()),
            DriverError::NotFound("Country x not found".to_owned()).into()
        );
        assert_eq!(
            RestError::InternalError("boom".to_owned()),
            DriverError::BackendError("boom".to_owned()).into()
        );
        assert_eq!(
            RestError::unprocessable("Already exists"),
            DriverError::AlreadyExists("Already exists".to_owned()).into()
        );

        let errors = FieldErrors::from([("name", "is required")]);
        assert_eq!(
            RestError::UnprocessableEntity {
                message: "Validation failed".to_owned(),
                errors: errors.clone()
            },
            DriverError::InvalidInput(errors).into()
        );
    }

    #[tokio::test]
    async fn test_into_response_field_errors() {
        let errors = FieldErrors::from([("name", "is required"), ("code", "must be a string")]);
        let (status, _headers, envelope) = decode(RestError::from(errors).into_response()).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, status);
        assert_eq!(422, envelope.code);
        assert_eq!("Validation failed", envelope.message);
        assert_eq!(
            serde_json::json!({"name": "is required", "code": "must be a string"}),
            envelope.data
        );
        assert!(envelope.meta.is_none());
    }

    #[tokio::test]
    async fn test_into_response_internal_error_hides_details() {
        let error = RestError::InternalError("connection string with secrets".to_owned());
        let (status, _headers, envelope) = decode(error.into_response()).await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        assert_eq!(500, envelope.code);
        assert_eq!("Internal server error", envelope.message);
        assert_eq!(serde_json::Value::Null, envelope.data);
    }

    #[tokio::test]
    async fn test_into_response_method_not_allowed() {
        let error = RestError::MethodNotAllowed("Method PUT not allowed for /x".to_owned());
        let (status, _headers, envelope) = decode(error.into_response()).await;
        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, status);
        assert_eq!(405, envelope.code);
        assert_eq!("Method PUT not allowed for /x", envelope.message);
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let error = RestError::NotFound("Country x not found".to_owned());
        let (status, _headers, envelope) = decode(error.into_response()).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!(404, envelope.code);
        assert_eq!("Country x not found", envelope.message);
        assert_eq!(serde_json::Value::Null, envelope.data);
    }

    #[tokio::test]
    async fn test_into_response_unauthorized() {
        let error = RestError::Unauthorized {
            scheme: "Bearer",
            realm: "transit",
            message: "Missing Authorization header".to_owned(),
        };
        let (status, headers, envelope) = decode(error.into_response()).await;
        assert_eq!(StatusCode::UNAUTHORIZED, status);
        assert_eq!("Bearer realm=\"transit\"", headers.get("WWW-Authenticate").unwrap());
        assert_eq!("Unauthorized: Missing Authorization header", envelope.message);
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope::ok(serde_json::json!([1, 2]));
        assert_eq!(
            serde_json::json!({"code": 200, "message": "OK", "data": [1, 2]}),
            serde_json::to_value(&envelope).unwrap()
        );

        let meta = Meta { page: 2, per_page: 5, total: 7, total_pages: 2 };
        let envelope = Envelope::ok(serde_json::json!([])).with_meta(meta);
        assert_eq!(
            serde_json::json!({
                "code": 200,
                "message": "OK",
                "data": [],
                "meta": {"page": 2, "per_page": 5, "total": 7, "total_pages": 2},
            }),
            serde_json::to_value(&envelope).unwrap()
        );

        let envelope = Envelope::created(serde_json::Value::Null);
        assert_eq!(201, envelope.code);
        assert_eq!("Created", envelope.message);
    }

    #[test]
    fn test_get_unique_header_missing() {
        let mut headers = HeaderMap::new();
        headers.append("ignore-me", "ignored".parse().unwrap());
        assert!(get_unique_header(&headers, "the-header").unwrap().is_none());
    }

    #[test]
    fn test_get_unique_header_one() {
        let mut headers = HeaderMap::new();
        headers.append("ignore-me", "ignored".parse().unwrap());
        headers.append("the-header", "foo".parse().unwrap());
        assert_eq!(b"foo", get_unique_header(&headers, "the-header").unwrap().unwrap().as_bytes());
    }

    #[test]
    fn test_get_unique_header_many() {
        let mut headers = HeaderMap::new();
        headers.append("the-header", "foo".parse().unwrap());
        headers.append("ignore-me", "ignored".parse().unwrap());
        headers.append("The-Header", "bar".parse().unwrap());
        assert_eq!(
            RestError::BadRequest("Header the-header cannot have more than one value".to_owned()),
            get_unique_header(&headers, "the-header").unwrap_err()
        );
    }

    #[test]
    fn test_get_bearer_auth_ok() {
        let mut headers = HeaderMap::new();
        headers.append("Authorization", "Bearer the-token".parse().unwrap());
        assert_eq!("the-token", get_bearer_auth(&headers, "the-realm").unwrap());
    }

    /// Runs `get_bearer_auth` with an invalid set of header `values` and ensures that the call
    /// fails with an `Unauthorized` error that contains `exp_error` in the failure message.
    fn do_get_bearer_auth_error_test(exp_error: &str, values: &[&[u8]]) {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append("Authorization", HeaderValue::from_bytes(value).unwrap());
        }
        match get_bearer_auth(&headers, "the-realm") {
            Err(RestError::Unauthorized { scheme, realm, message }) => {
                assert_eq!("Bearer", scheme);
                assert_eq!("the-realm", realm);
                assert!(
                    message.contains(exp_error),
                    "Message '{}' does not contain '{}'",
                    message,
                    exp_error
                );
            }
            e => panic!("Expected an Unauthorized error but got {:?}", e),
        }
    }

    #[test]
    fn test_get_bearer_auth_errors() {
        do_get_bearer_auth_error_test("Missing Authorization", &[]);
        do_get_bearer_auth_error_test("more than one value", &[b"Bearer a", b"Bearer b"]);
        do_get_bearer_auth_error_test("Bad encoding", &[b"Bearer \xff"]);
        do_get_bearer_auth_error_test("missing scheme", &[b" token"]);
        do_get_bearer_auth_error_test("missing payload", &[b"Bearer"]);
        do_get_bearer_auth_error_test("Unsupported scheme", &[b"Basic abc"]);
    }
}
