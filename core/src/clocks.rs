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

//! Collection of clock implementations.

use time::OffsetDateTime;

/// Generic definition of a clock.
pub trait Clock {
    /// Returns the current UTC time.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Clock implementation that uses the system clock.
#[derive(Clone, Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    /// A clock that returns a preconfigured instant and that can only move forward.
    ///
    /// Only supports second-level precision, which is all that HTTP dates can represent.
    pub struct SettableClock {
        /// Current fake time in seconds since the Unix epoch.
        now_secs: AtomicI64,
    }

    impl SettableClock {
        /// Creates a new clock that returns `now` until moved with `advance`.
        pub fn new(now: OffsetDateTime) -> Self {
            assert!(now.nanosecond() == 0, "Sub-second precision not supported");
            Self { now_secs: AtomicI64::new(now.unix_timestamp()) }
        }

        /// Advances the current time by `delta`.
        pub fn advance(&self, delta: Duration) {
            assert!(delta.subsec_nanos() == 0, "Sub-second precision not supported");
            let delta_secs = i64::try_from(delta.as_secs()).unwrap();
            self.now_secs.fetch_add(delta_secs, Ordering::SeqCst);
        }
    }

    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            let now_secs = self.now_secs.load(Ordering::SeqCst);
            OffsetDateTime::from_unix_timestamp(now_secs).unwrap()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::panic::catch_unwind;
        use time::macros::datetime;

        #[test]
        fn test_settableclock_second_precision_supported() {
            let now = datetime!(2023-12-01 10:15:00 UTC);
            let clock = SettableClock::new(now);
            assert_eq!(now, clock.now_utc());

            clock.advance(Duration::from_secs(30));
            assert_eq!(datetime!(2023-12-01 10:15:30 UTC), clock.now_utc());

            clock.advance(Duration::from_secs(90));
            assert_eq!(datetime!(2023-12-01 10:17:00 UTC), clock.now_utc());
        }

        #[test]
        fn test_settableclock_subsecond_precision_unsupported() {
            catch_unwind(|| {
                SettableClock::new(datetime!(2023-12-01 10:20:00.5 UTC));
            })
            .unwrap_err();

            let clock = SettableClock::new(datetime!(2023-12-01 10:20:00 UTC));
            catch_unwind(|| {
                clock.advance(Duration::from_millis(1));
            })
            .unwrap_err();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_systemclock_trivial() {
        let clock = SystemClock::default();
        let now1 = clock.now_utc();
        assert!(now1.unix_timestamp() > 0);
        let now2 = clock.now_utc();
        assert!(now2 >= now1);
    }
}
