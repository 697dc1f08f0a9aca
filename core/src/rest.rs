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
//! All services should implement an `app` function in their `rest` module that builds the
//! `router::Router` for the application and turns it into an `axum::Router` via `app` here.
//!
//! Every API should be put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This
//! may seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.
//!
//! More specifically, the `tests` module within an API should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the module
//! then rely on `route` to obtain this information, ensuring that they all test the desired API.
//!
//! It is also useful for the tests in this layer to define a `TestContext` in a `testutils` module
//! that allows interacting with the driver layer directly, using simplified types.

use crate::clocks::Clock;
use crate::router::{RouteMatch, RouteParams, Router};
use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::header::{CONTENT_TYPE, DATE, SERVER};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use log::{debug, warn};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::format_description;

mod percent;
pub use percent::percent_decode;

/// Content type of every response body that does not specify its own.
pub const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a path parameter cannot be decoded.  The details are only logged and the
    /// response carries no body.
    #[error("{0}")]
    InvalidParameter(String),

    /// Indicates that the request body exceeds the configured limit.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl From<fmt::Error> for RestError {
    fn from(e: fmt::Error) -> Self {
        RestError::InternalError(e.to_string())
    }
}

impl From<serde_json::Error> for RestError {
    fn from(e: serde_json::Error) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = match self {
            RestError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidParameter(ref e) => {
                debug!("Rejecting request with undecodable parameter: {}", e);
                return StatusCode::BAD_REQUEST.into_response();
            }
            RestError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        };
        (status, self.to_string()).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Formats `when` as an HTTP date, as used in the `Date` header.
pub fn format_http_date(when: OffsetDateTime) -> String {
    let when = when.to_offset(time::UtcOffset::UTC);
    when.format(format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    ))
    .expect("All components of an OffsetDateTime are available for formatting")
}

/// A request as seen by a handler after routing, with its body fully buffered.
pub struct RouteRequest {
    /// The request method.
    pub method: Method,

    /// Raw parameters captured from the path.
    pub params: RouteParams,

    /// The complete request body.  Always empty for fallback handlers, which never read it.
    pub body: Bytes,
}

impl RouteRequest {
    /// Returns the raw value of the path parameter `name`.
    ///
    /// Handlers only ask for parameters declared in their own pattern, so a missing parameter
    /// indicates a bug in the route table.
    pub fn param(&self, name: &str) -> RestResult<&str> {
        self.params.get(name).ok_or_else(|| {
            RestError::InternalError(format!("Route does not capture parameter '{}'", name))
        })
    }
}

/// A type-erased handler that can be stored in a `Router`.
pub type BoxedHandler<S> =
    Box<dyn Fn(S, RouteRequest) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wraps an async function `f` that takes the app state and a `RouteRequest` into a handler
/// suitable for a `Router`.
pub fn handler<S, F, Fut, R>(f: F) -> BoxedHandler<S>
where
    F: Fn(S, RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Box::new(move |state, request| {
        let fut = f(state, request);
        async move { fut.await.into_response() }.boxed()
    })
}

/// Settings for the app returned by `app`.
#[derive(Clone, Debug)]
pub struct AppOptions {
    /// Value of the `Server` header in every response.
    pub server: HeaderValue,

    /// Maximum number of bytes accepted in a request body.
    pub max_body_size: usize,
}

/// Routes every request to the handlers of a `Router`.
struct Dispatcher<S> {
    /// The route table.
    routes: Router<BoxedHandler<S>>,

    /// State handed to every handler.
    state: S,

    /// Clock used to stamp the `Date` header.
    clock: Arc<dyn Clock + Send + Sync>,

    /// App settings.
    opts: AppOptions,
}

impl<S> Dispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Consults the route table once for `request` and runs the selected handler, if any.
    async fn dispatch(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let mut response = match self.routes.route(&parts.method, parts.uri.path()) {
            RouteMatch::Found { handler, params } => {
                debug!("Dispatching {} {}", parts.method, parts.uri.path());
                match self.read_body(body).await {
                    Ok(body) => {
                        let request = RouteRequest { method: parts.method, params, body };
                        handler(self.state.clone(), request).await
                    }
                    Err(e) => e.into_response(),
                }
            }
            RouteMatch::Fallback { handler, params } => {
                debug!("Dispatching {} {} to fallback", parts.method, parts.uri.path());
                let request = RouteRequest { method: parts.method, params, body: Bytes::new() };
                handler(self.state.clone(), request).await
            }
            RouteMatch::MethodNotAllowed => {
                debug!("No handler for {} {} and no fallback", parts.method, parts.uri.path());
                StatusCode::NOT_FOUND.into_response()
            }
            RouteMatch::NotFound => {
                debug!("No route for {} {}", parts.method, parts.uri.path());
                StatusCode::NOT_FOUND.into_response()
            }
        };
        self.add_standard_headers(response.headers_mut());
        response
    }

    /// Buffers the whole request `body`, enforcing the maximum size.
    ///
    /// Bodies that announce their length are rejected upfront.  Bodies of unknown length, such as
    /// chunked ones, are rejected as soon as the received data crosses the limit.
    async fn read_body(&self, body: Body) -> RestResult<Bytes> {
        let max = self.opts.max_body_size;
        if body.size_hint().lower() > max as u64 {
            return Err(RestError::PayloadTooLarge(max));
        }

        let mut data = BytesMut::new();
        let mut stream = body.into_data_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                RestError::InvalidRequest(format!("Cannot read request body: {}", e))
            })?;
            if data.len() + chunk.len() > max {
                return Err(RestError::PayloadTooLarge(max));
            }
            data.extend_from_slice(&chunk);
        }
        Ok(data.freeze())
    }

    /// Adds the headers that every response carries.
    fn add_standard_headers(&self, headers: &mut HeaderMap) {
        headers.insert(SERVER, self.opts.server.clone());
        let date = format_http_date(self.clock.now_utc());
        match HeaderValue::from_str(&date) {
            Ok(value) => {
                headers.insert(DATE, value);
            }
            Err(e) => warn!("Cannot use '{}' as a Date header: {}", date, e),
        }
        headers.entry(CONTENT_TYPE).or_insert(HeaderValue::from_static(TEXT_PLAIN_UTF_8));
    }
}

/// Creates the `axum::Router` that serves `routes`, handing a copy of `state` to every handler.
///
/// The route table is consulted exactly once per request.  Requests that do not match any
/// pattern, or that match a pattern without a handler or fallback for their method, get a 404.
pub fn app<S>(
    routes: Router<BoxedHandler<S>>,
    state: S,
    clock: Arc<dyn Clock + Send + Sync>,
    opts: AppOptions,
) -> axum::Router
where
    S: Clone + Send + Sync + 'static,
{
    let dispatcher = Arc::new(Dispatcher { routes, state, clock, opts });
    axum::Router::new()
        .fallback(move |request: Request| async move { dispatcher.dispatch(request).await })
}

/// Common test code for the REST server.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use axum::http::{self, HeaderName};
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Maximum body size for testing purposes.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a single request to the API server.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router for the app being tested.
        app: axum::Router,

        /// Builder for the request that will be sent to the app.
        builder: http::request::Builder,
    }

    impl OneShotBuilder {
        /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
        pub fn new<U: AsRef<str>>(app: axum::Router, (method, uri): (http::Method, U)) -> Self {
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
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
            let request = self.builder.body(Body::empty()).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a text payload.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
                .body(Body::from(text.into()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a JSON payload.
        pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(serde_json::to_vec(&request).unwrap()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }
    }

    /// Type alias for the complex type returned by the `oneshot` function.
    type HttpResponse = http::Response<Body>;

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

        /// Expects the header `name` to be present with exactly `value`.
        pub fn expect_header(self, name: &str, value: &str) -> Self {
            let actual = self.response.headers().get(name);
            assert_eq!(
                Some(value),
                actual.map(|v| v.to_str().unwrap()),
                "Unexpected value for header {}",
                name
            );
            self
        }

        /// Performs common validation operations on the response.
        pub fn verify(&self) {
            assert_eq!(self.exp_status, self.response.status());
        }

        /// Finishes checking the response and expects it to contain an empty body.
        pub async fn expect_empty(self) {
            let body = self.take_body_as_text().await;
            assert!(body.is_empty(), "Body not empty; got {}", body);
        }

        /// Finishes checking the response and expects its body to be valid UTF-8 and to match
        /// `exp_re`.
        pub async fn expect_text(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

            let body = self.take_body_as_text().await;
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
        }

        /// Finishes checking the response and expects it to contain a valid JSON object of
        /// type `T`.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            self.verify();

            let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            serde_json::from_slice::<T>(&body).unwrap()
        }

        /// Finishes checking the response and returns the body of the response as UTF-8.
        pub async fn take_body_as_text(self) -> String {
            self.verify();

            let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            String::from_utf8(body.to_vec()).unwrap()
        }

        /// Finishes checking the response and returns the response itself for out of band
        /// validation of properties not supported by the `ResponseChecker`.
        pub async fn take_response(self) -> HttpResponse {
            self.verify();

            self.response
        }
    }
}
