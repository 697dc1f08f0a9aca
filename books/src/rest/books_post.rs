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

//! API to add a book to the end of the collection.

use crate::driver::Driver;
use crate::model::Book;
use bookshelf_core::rest::{RestResult, RouteRequest};
use log::debug;

/// API handler.
pub(crate) async fn handler(driver: Driver, request: RouteRequest) -> RestResult<String> {
    let book: Book = serde_json::from_slice(&request.body)?;
    let num = driver.create_book(book).await;
    debug!("Created book #{}", num);
    Ok(String::new())
}
