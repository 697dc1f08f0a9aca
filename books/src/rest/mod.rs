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

use crate::driver::Driver;
use crate::model::{Book, BookNum};
use axum::http::header::CONNECTION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use bookshelf_core::clocks::Clock;
use bookshelf_core::rest::{self, AppOptions, BoxedHandler, RouteRequest, handler};
use bookshelf_core::router::{Router, RouterResult};
use std::fmt;
use std::sync::Arc;

mod author_get;
mod book_delete;
mod book_get;
mod book_put;
mod books_get;
mod books_post;
#[cfg(test)]
mod testutils;

/// Value of the `Server` header in all responses.
const SERVER: &str = concat!("bookshelf/", env!("CARGO_PKG_VERSION"));

/// Pattern that addresses a single book by its number, made of ASCII digits only.
const BOOKNUM: &str = "/:booknum([0-9]+)";

/// Formats the line that describes `book` at position `num` in listings.
fn format_entry(num: BookNum, book: &Book) -> String {
    format!("{}. {}[{}]\n", num, book.title(), book.author())
}

/// Formats the message returned when `num` does not refer to an existing book.
///
/// `num` is the parsed `BookNum` whenever possible, or the raw path text when it does not fit.
fn no_such_book<N: fmt::Display>(num: N) -> String {
    format!("No book with #{}\n", num)
}

/// Handler for any method a pattern does not support.
async fn method_not_allowed(_driver: Driver, _request: RouteRequest) -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(CONNECTION, "close")])
}

/// Creates the route table for the application.
fn routes() -> RouterResult<Router<BoxedHandler<Driver>>> {
    Router::builder()
        .get("/", handler(books_get::handler))
        .post("/", handler(books_post::handler))
        .fallback("/", handler(method_not_allowed))
        .get("/author/:author", handler(author_get::handler))
        .fallback("/author/:author", handler(method_not_allowed))
        .get(BOOKNUM, handler(book_get::handler))
        .put(BOOKNUM, handler(book_put::handler))
        .delete(BOOKNUM, handler(book_delete::handler))
        .fallback(BOOKNUM, handler(method_not_allowed))
        .build()
}

/// Creates the router for the application.
pub(crate) fn app(
    driver: Driver,
    clock: Arc<dyn Clock + Send + Sync>,
    max_body_size: usize,
) -> RouterResult<axum::Router> {
    let opts = AppOptions { server: HeaderValue::from_static(SERVER), max_body_size };
    Ok(rest::app(routes()?, driver, clock, opts))
}
