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

//! REST service that serves an in-memory collection of books.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use bookshelf_core::clocks::SystemClock;
use bookshelf_core::server::{Server, ServerOptions};
use std::error::Error;
use std::sync::Arc;

mod driver;
use driver::Driver;
pub(crate) mod model;
use model::Book;
mod rest;
use rest::app;

/// Returns the collection the service starts with.
pub(crate) fn initial_books() -> Vec<Book> {
    vec![
        Book::new("Murder on the Orient Express".to_owned(), "Agatha Christie".to_owned()),
        Book::new("Sleeping Murder".to_owned(), "Agatha Christie".to_owned()),
        Book::new("The C++ Programming Language".to_owned(), "B. Stroustrup".to_owned()),
    ]
}

/// Instantiates all resources to serve the application as configured by `opts`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(opts: ServerOptions) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(initial_books());
    let app = app(driver, Arc::new(SystemClock::default()), opts.max_body_size)?;

    let server = Server::bind(opts).await?;
    server.serve(app).await?;
    Ok(())
}
