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

//! Compilation of path patterns into segment matchers.

use crate::router::{RouteParams, RouterError, RouterResult};
use regex::Regex;

/// A single compiled segment of a path pattern.
#[derive(Debug)]
pub(crate) enum Segment {
    /// Accepts only a segment equal to the given text.
    Literal(String),

    /// Accepts a segment and binds it to `name`.
    Capture {
        /// Name of the parameter that receives the raw segment.
        name: String,

        /// Whole-segment regular expression the input must match.  Without a constraint, any
        /// non-empty segment is accepted.  Perl classes such as `\d` are Unicode-aware, so ASCII
        /// inputs need explicit ranges like `[0-9]`.
        constraint: Option<Regex>,
    },
}

impl Segment {
    /// Checks if this segment accepts the `input` path segment.
    fn accepts(&self, input: &str) -> bool {
        match self {
            Segment::Literal(text) => text == input,
            Segment::Capture { constraint: None, .. } => !input.is_empty(),
            Segment::Capture { constraint: Some(re), .. } => re.is_match(input),
        }
    }
}

/// Checks if `name` is valid as a parameter name.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => (),
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Compiles a single `:name` or `:name(regex)` capture, without the leading colon.
fn compile_capture(pattern: &str, capture: &str) -> RouterResult<Segment> {
    let invalid = |reason: String| RouterError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason,
    };

    let (name, constraint) = match capture.find('(') {
        None => {
            if capture.contains(')') {
                return Err(invalid(format!("Unbalanced parentheses in ':{}'", capture)));
            }
            (capture, None)
        }
        Some(pos) => {
            let Some(re) = capture[pos + 1..].strip_suffix(')') else {
                return Err(invalid(format!("Unbalanced parentheses in ':{}'", capture)));
            };
            if re.is_empty() {
                return Err(invalid(format!("Empty constraint for ':{}'", &capture[..pos])));
            }
            let re = Regex::new(&format!("^(?:{})$", re))
                .map_err(|e| invalid(format!("Bad constraint for ':{}': {}", &capture[..pos], e)))?;
            (&capture[..pos], Some(re))
        }
    };

    if !is_valid_name(name) {
        return Err(invalid(format!("Invalid parameter name '{}'", name)));
    }
    Ok(Segment::Capture { name: name.to_owned(), constraint })
}

/// Splits an absolute `path` into its segments, or returns `None` if it is not absolute.
///
/// The root path `/` is made of a single empty segment.
pub(crate) fn split_path(path: &str) -> Option<Vec<&str>> {
    path.strip_prefix('/').map(|rest| rest.split('/').collect())
}

/// A path pattern compiled into an ordered list of segment matchers.
#[derive(Debug)]
pub(crate) struct Pattern {
    /// The pattern as written at registration time.
    text: String,

    /// Matchers for each segment of the path, in order.
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles the textual pattern `text`.
    pub(crate) fn compile(text: &str) -> RouterResult<Self> {
        let Some(raw_segments) = split_path(text) else {
            return Err(RouterError::InvalidPattern {
                pattern: text.to_owned(),
                reason: "Patterns must start with a slash".to_owned(),
            });
        };

        let mut segments = Vec::with_capacity(raw_segments.len());
        for raw in raw_segments {
            let segment = match raw.strip_prefix(':') {
                Some(capture) => compile_capture(text, capture)?,
                None => Segment::Literal(raw.to_owned()),
            };

            if let Segment::Capture { name, .. } = &segment {
                let duplicate = segments.iter().any(|other| {
                    matches!(other, Segment::Capture { name: existing, .. } if existing == name)
                });
                if duplicate {
                    return Err(RouterError::InvalidPattern {
                        pattern: text.to_owned(),
                        reason: format!("Duplicate parameter name '{}'", name),
                    });
                }
            }

            segments.push(segment);
        }

        Ok(Self { text: text.to_owned(), segments })
    }

    /// Returns the pattern as written at registration time.
    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    /// Matches the pattern against the already-split `path` and returns the captured parameters
    /// on success.
    pub(crate) fn matches(&self, path: &[&str]) -> Option<RouteParams> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::default();
        for (segment, input) in self.segments.iter().zip(path) {
            if !segment.accepts(input) {
                return None;
            }
            if let Segment::Capture { name, .. } = segment {
                params.push(name.clone(), (*input).to_owned());
            }
        }
        Some(params)
    }
}
