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

//! API to list the books written by one author.

use crate::driver::Driver;
use crate::rest::format_entry;
use bookshelf_core::rest::{RestResult, RouteRequest, percent_decode};
use std::fmt::Write;

/// API handler.
pub(crate) async fn handler(driver: Driver, request: RouteRequest) -> RestResult<String> {
    let author = percent_decode(request.param("author")?)?;
    let books = driver.get_books_by_author(&author).await;

    let mut response = format!("Books of {}:\n", author);
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

    fn route(author: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/author/{}", author))
    }

    #[tokio::test]
    async fn test_some() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route("B.%20Stroustrup"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!(
            "Books of B. Stroustrup:\n3. The C++ Programming Language[B. Stroustrup]\n",
            body
        );
    }

    #[tokio::test]
    async fn test_none() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route("Nobody"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("Books of Nobody:\n", body);
    }

    #[tokio::test]
    async fn test_case_sensitive() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route("agatha%20christie"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("Books of agatha christie:\n", body);
    }

    #[tokio::test]
    async fn test_decodes_utf8() {
        let context = TestContext::setup_with_books(vec![
            book("Cien años de soledad", "Gabriel García Márquez"),
            book("Other", "Someone"),
        ]);

        let author = "Gabriel%20Garc%C3%ADa%20M%C3%A1rquez";
        let body = OneShotBuilder::new(context.app(), route(author))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!(
            "Books of Gabriel García Márquez:\n1. Cien años de soledad[Gabriel García Márquez]\n",
            body
        );
    }

    #[tokio::test]
    async fn test_bad_percent_encoding() {
        let context = TestContext::setup();

        for author in ["Agatha%2", "Agatha%zzChristie", "%FF"] {
            OneShotBuilder::new(context.app(), route(author))
                .send_empty()
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_header("content-type", "text/plain; charset=utf-8")
                .expect_empty()
                .await;
        }
    }
}
