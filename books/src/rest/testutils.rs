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

//! Test utilities for the REST API.

use crate::driver::Driver;
use crate::model::Book;
use crate::rest::app;
use bookshelf_core::clocks::testutils::SettableClock;
use std::sync::Arc;
use time::macros::datetime;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 1024;

pub(crate) struct TestContext {
    driver: Driver,
    clock: Arc<SettableClock>,
    app: axum::Router,
}

impl TestContext {
    /// Sets up an app that serves the initial collection of books.
    pub(crate) fn setup() -> Self {
        Self::setup_with_books(crate::initial_books())
    }

    /// Sets up an app that serves `books`.
    pub(crate) fn setup_with_books(books: Vec<Book>) -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let driver = Driver::new(books);
        let clock = Arc::new(SettableClock::new(datetime!(1994-11-06 08:49:37 UTC)));
        let app = app(driver.clone(), clock.clone(), MAX_BODY_SIZE).unwrap();
        Self { driver, clock, app }
    }

    pub(crate) fn app(&self) -> axum::Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> axum::Router {
        self.app
    }

    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Returns a snapshot of the collection served by the app.
    pub(crate) async fn books(&self) -> Vec<Book> {
        self.driver.clone().get_books().await.into_iter().map(|(_, book)| book).collect()
    }
}

/// Creates a book from hardcoded strings.
pub(crate) fn book(title: &str, author: &str) -> Book {
    Book::new(title.to_owned(), author.to_owned())
}
