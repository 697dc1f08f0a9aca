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

//! Test utilities for the business layer.

use crate::driver::Driver;
use crate::model::Book;

pub(crate) struct TestContext {
    driver: Driver,
}

impl TestContext {
    pub(crate) fn setup(books: Vec<Book>) -> Self {
        Self { driver: Driver::new(books) }
    }

    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    pub(crate) async fn books(&self) -> Vec<Book> {
        self.driver.books.lock().await.clone()
    }
}

/// Creates a book from hardcoded strings.
pub(crate) fn book(title: &str, author: &str) -> Book {
    Book::new(title.to_owned(), author.to_owned())
}
