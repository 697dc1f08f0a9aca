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

//! Utilities to deal with environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Result type for environment errors.
type Result<T> = std::result::Result<T, String>;

/// Wrapper around an environment variable's value to support conversions to other types.
pub struct Value(String);

/// Generates a `TryFrom<Value>` for a type that can be parsed by `FromStr`.
macro_rules! tryfrom_value_for_fromstr [
    ( $t:ty ) => {
        impl TryFrom<Value> for $t {
            type Error = String;

            fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
                value.0.parse::<$t>().map_err(|e| format!("Invalid {}: {}", stringify!($t), e))
            }
        }
    }
];

tryfrom_value_for_fromstr!(usize);
tryfrom_value_for_fromstr!(SocketAddr);

impl TryFrom<Value> for Duration {
    type Error = String;

    /// Parses durations of the form `<n>ms`, `<n>s` or `<n>m`.
    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let s = value.0.as_str();
        let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
            (n, 1)
        } else if let Some(n) = s.strip_suffix('s') {
            (n, 1000)
        } else if let Some(n) = s.strip_suffix('m') {
            (n, 60 * 1000)
        } else {
            return Err(format!("Invalid Duration: '{}' lacks a ms, s or m suffix", s));
        };
        let number = number.parse::<u64>().map_err(|e| format!("Invalid Duration: {}", e))?;
        match number.checked_mul(scale) {
            Some(millis) => Ok(Duration::from_millis(millis)),
            None => Err(format!("Invalid Duration: '{}' is too large", s)),
        }
    }
}

/// Reads the environment variable `name`, returning `None` if it is not set.
fn get_var<T: TryFrom<Value, Error = String>>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => match Value(value).try_into() {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(format!("Invalid type in environment variable {}: {}", name, e)),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(format!("Invalid value in environment variable {}", name))
        }
    }
}

/// Gets an optional environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.
pub fn get_optional_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<Option<T>> {
    get_var(&format!("{}_{}", prefix, suffix))
}
