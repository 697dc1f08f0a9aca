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

//! Strict decoding of percent-encoded path parameters.

use crate::rest::{RestError, RestResult};
use std::borrow::Cow;

/// Decodes the percent-encoded `raw` text into a UTF-8 string.
///
/// Unlike lenient decoders, every `%` must be followed by two hexadecimal digits and the decoded
/// bytes must be valid UTF-8.  A `+` is kept as is because paths are not form-encoded.
///
/// Failures are reported as `RestError::InvalidParameter`, which answers with an empty 400.
pub fn percent_decode(raw: &str) -> RestResult<String> {
    let bytes = raw.as_bytes();
    let mut pos = 0;
    while let Some(offset) = bytes[pos..].iter().position(|b| *b == b'%') {
        let start = pos + offset;
        match bytes.get(start + 1..start + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => pos = start + 3,
            _ => {
                return Err(RestError::InvalidParameter(format!(
                    "Invalid percent-encoded sequence at offset {} in '{}'",
                    start, raw
                )));
            }
        }
    }

    percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| RestError::InvalidParameter(format!("Invalid UTF-8 in '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode_ok() {
        for (exp, raw) in [
            ("", ""),
            ("plain", "plain"),
            ("Agatha Christie", "Agatha%20Christie"),
            ("B. Stroustrup", "B.%20Stroustrup"),
            ("a+b", "a+b"),
            ("100%", "100%25"),
            ("/", "%2f"),
            ("Gabriel García Márquez", "Gabriel%20Garc%C3%ADa%20M%C3%A1rquez"),
        ] {
            assert_eq!(exp, percent_decode(raw).unwrap(), "Decoding {}", raw);
        }
    }

    #[test]
    fn test_percent_decode_bad_sequence() {
        for (raw, offset) in [("%", 0), ("a%2", 1), ("abc%zz", 3), ("%20%2g", 3), ("%%20", 0)] {
            assert_eq!(
                RestError::InvalidParameter(format!(
                    "Invalid percent-encoded sequence at offset {} in '{}'",
                    offset, raw
                )),
                percent_decode(raw).unwrap_err()
            );
        }
    }

    #[test]
    fn test_percent_decode_bad_utf8() {
        let err = percent_decode("%C3%28").unwrap_err();
        assert!(err.to_string().starts_with("Invalid UTF-8 in '%C3%28'"), "Got {}", err);
    }
}
