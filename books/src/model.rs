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

//! High-level data types.

use bookshelf_core::model::{ModelError, ModelResult};
use derive_getters::Getters;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

/// A book in the collection.
///
/// Both fields are mandatory in the JSON representation: a document that lacks either of them or
/// that has a non-string value in them is rejected.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub(crate) struct Book {
    /// The book's title.
    #[serde(rename = "Title")]
    title: String,

    /// The book's author, compared verbatim when searching by author.
    #[serde(rename = "Author")]
    author: String,
}

/// The user-visible position of a book in the collection.
///
/// Numbers start at 1 and follow insertion order, so they are not stable identifiers: removing a
/// book renumbers all the books that come after it.  A `BookNum` may refer to a position that
/// does not exist, which is only detected when the collection is accessed.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub(crate) struct BookNum(usize);

impl BookNum {
    /// Parses a book number from the decimal digits in `s`.
    pub(crate) fn parse(s: &str) -> ModelResult<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError(format!("Book number '{}' is not a number", s)));
        }
        match s.parse::<usize>() {
            Ok(num) => Ok(Self(num)),
            Err(e) => Err(ModelError(format!("Book number '{}' is out of range: {}", s, e))),
        }
    }

    /// Returns the book number for the 0-based position `index`.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// Returns the 0-based position of this book number within a collection of `len` books, or
    /// `None` if no such book exists.
    pub(crate) fn to_index(self, len: usize) -> Option<usize> {
        if self.0 >= 1 && self.0 <= len { Some(self.0 - 1) } else { None }
    }
}
