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

//! Operations on the whole collection of books.

use crate::driver::Driver;
use crate::model::*;

impl Driver {
    /// Gets all books along with their numbers.
    pub(crate) async fn get_books(self) -> Vec<(BookNum, Book)> {
        let books = self.books.lock().await;
        books.iter().enumerate().map(|(i, book)| (BookNum::from_index(i), book.clone())).collect()
    }

    /// Gets the books whose author is exactly `author`, along with their numbers in the whole
    /// collection.
    pub(crate) async fn get_books_by_author(self, author: &str) -> Vec<(BookNum, Book)> {
        let books = self.books.lock().await;
        books
            .iter()
            .enumerate()
            .filter(|(_, book)| book.author() == author)
            .map(|(i, book)| (BookNum::from_index(i), book.clone()))
            .collect()
    }

    /// Appends `book` to the collection and returns its number.
    pub(crate) async fn create_book(self, book: Book) -> BookNum {
        let mut books = self.books.lock().await;
        books.push(book);
        BookNum::from_index(books.len() - 1)
    }
}
