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

//! API to list all books.

use crate::driver::Driver;
use crate::rest::format_entry;
use bookshelf_core::rest::{RestResult, RouteRequest};
use std::fmt::Write;

/// API handler.
pub(crate) async fn handler(driver: Driver, _request: RouteRequest) -> RestResult<String> {
    let books = driver.get_books().await;

    let mut response = format!("Book collection (book count: {})\n", books.len());
    for (num, book) in books {
        write!(response, "{}", format_entry(num, &book))?;
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use bookshelf_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/".to_owned())
    }

    #[tokio::test]
    async fn test_initial_collection() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!(
            "Book collection (book count: 3)\n\
             1. Murder on the Orient Express[Agatha Christie]\n\
             2. Sleeping Murder[Agatha Christie]\n\
             3. The C++ Programming Language[B. Stroustrup]\n",
            body
        );
    }

    #[tokio::test]
    async fn test_empty() {
        let context = TestContext::setup_with_books(vec![]);

        OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_text("^Book collection \\(book count: 0\\)\n$")
            .await;
    }

    #[tokio::test]
    async fn test_ignores_body() {
        let context = TestContext::setup_with_books(vec![book("T", "A")]);

        let body = OneShotBuilder::new(context.app(), route())
            .send_text("unexpected")
            .await
            .take_body_as_text()
            .await;
        assert_eq!("Book collection (book count: 1)\n1. T[A]\n", body);
    }
}
