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

//! Business logic for the service.

use crate::model::Book;
use futures::lock::Mutex;
use std::sync::Arc;

mod book;
mod books;
#[cfg(test)]
mod testutils;

/// Business logic.
///
/// The driver owns the book collection.  All operations lock the whole collection for their
/// entire duration because books are addressed by position and any concurrent insertion or
/// removal would change which book a position refers to.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The book collection, in insertion order.
    books: Arc<Mutex<Vec<Book>>>,
}

impl Driver {
    /// Creates a new driver that serves the `books` collection.
    pub(crate) fn new(books: Vec<Book>) -> Self {
        Self { books: Arc::from(Mutex::new(books)) }
    }
}
