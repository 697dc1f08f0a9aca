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

//! API to replace one book.

use crate::driver::Driver;
use crate::model::{Book, BookNum};
use crate::rest::no_such_book;
use bookshelf_core::driver::DriverError;
use bookshelf_core::rest::{RestError, RestResult, RouteRequest};

/// API handler.
///
/// The body is validated before the book number so that a malformed body is always reported,
/// even when it targets a book that does not exist.
pub(crate) async fn handler(driver: Driver, request: RouteRequest) -> RestResult<String> {
    let book: Book = serde_json::from_slice(&request.body)?;

    let raw = request.param("booknum")?;
    let Ok(num) = BookNum::parse(raw) else {
        return Err(RestError::InvalidRequest(no_such_book(raw)));
    };

    match driver.update_book(num, book).await {
        Ok(()) => Ok(String::new()),
        Err(DriverError::NotFound(_)) => Err(RestError::InvalidRequest(no_such_book(num))),
    }
}
