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

//! API to delete one book.

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

    match driver.delete_book(num).await {
        Ok(book) => Ok(format!("Delete book #{}: {}[{}]\n", num, book.title(), book.author())),
        Err(DriverError::NotFound(_)) => Ok(no_such_book(num)),
    }
}
