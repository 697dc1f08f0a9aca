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

//! Operations on one book.

use crate::driver::Driver;
use crate::model::*;
use bookshelf_core::driver::{DriverError, DriverResult};

/// Builds the error returned when `num` does not refer to an existing book.
fn no_such_book(num: BookNum) -> DriverError {
    DriverError::NotFound(format!("No book with #{}", num))
}

impl Driver {
    /// Gets the book at `num`.
    pub(crate) async fn get_book(self, num: BookNum) -> DriverResult<Book> {
        let books = self.books.lock().await;
        match num.to_index(books.len()) {
            Some(i) => Ok(books[i].clone()),
            None => Err(no_such_book(num)),
        }
    }

    /// Replaces the book at `num` with `book`.
    pub(crate) async fn update_book(self, num: BookNum, book: Book) -> DriverResult<()> {
        let mut books = self.books.lock().await;
        match num.to_index(books.len()) {
            Some(i) => {
                books[i] = book;
                Ok(())
            }
            None => Err(no_such_book(num)),
        }
    }

    /// Removes the book at `num` and returns it.  Books after it are renumbered.
    pub(crate) async fn delete_book(self, num: BookNum) -> DriverResult<Book> {
        let mut books = self.books.lock().await;
        match num.to_index(books.len()) {
            Some(i) => Ok(books.remove(i)),
            None => Err(no_such_book(num)),
        }
    }
}
