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

//! Generic business logic for any service.
//!
//! Every service should implement its own `Driver` type holding the in-memory state of the app.
//! The definition will typically look like this:
//!
//! ```rust
//! use futures::lock::Mutex;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! pub(crate) struct Driver {
//!     /// The collection served by the app.
//!     items: Arc<Mutex<Vec<String>>>,
//!
//!     // ... other fields here ...
//! }
//! ```
//!
//! Every operation implemented in the `Driver` should consume `self` and hold the state lock for
//! the whole operation.  State that is addressed by position, such as a list, is invalidated by
//! concurrent insertions and removals, so a single operation must never release the lock between
//! checking a position and using it.

/// Business logic errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;
