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

//! API to get one book.

use crate::driver::Driver;
use crate::model::BookNum;
use crate::rest::no_such_book;
use bookshelf_core::driver::DriverError;
use bookshelf_core::rest::{RestResult, RouteRequest};

/// API handler.
pub(crate) async fn handler(driver: Driver, request: RouteRequest) -> RestResult<String> {
    let raw = request.param("booknum")?;
    let Ok(num) = BookNum::parse(raw) else {
        return Ok(no_such_book(raw));
    };

    match driver.get_book(num).await {
        Ok(book) => Ok(format!("Book #{} is: {} [{}]\n", num, book.title(), book.author())),
        Err(DriverError::NotFound(_)) => Ok(no_such_book(num)),
    }
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use bookshelf_core::rest::testutils::*;

    fn route(num: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/{}", num))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route("3"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("Book #3 is: The C++ Programming Language [B. Stroustrup]\n", body);
    }

    #[tokio::test]
    async fn test_leading_zeros() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route("01"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("Book #1 is: Murder on the Orient Express [Agatha Christie]\n", body);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let context = TestContext::setup();

        for num in ["0", "4", "99999999999999999999999999"] {
            let body = OneShotBuilder::new(context.app(), route(num))
                .send_empty()
                .await
                .take_body_as_text()
                .await;
            assert_eq!(format!("No book with #{}\n", num), body);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_prints_parsed_number() {
        let context = TestContext::setup();

        let body = OneShotBuilder::new(context.app(), route("004"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("No book with #4\n", body);
    }

    #[tokio::test]
    async fn test_not_a_number() {
        let context = TestContext::setup();

        for num in ["-1", "1a", "one", "\u{0663}"] {
            OneShotBuilder::new(context.app(), route(num))
                .send_empty()
                .await
                .expect_status(http::StatusCode::NOT_FOUND)
                .expect_empty()
                .await;
        }
    }
}
