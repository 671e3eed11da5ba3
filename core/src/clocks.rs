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
        let now = OffsetDateTime::now_utc();

        // Truncate the timestamp to microsecond resolution as this is the resolution supported by
        // timestamps in all of our databases.  Better be consistent everywhere.
        let nanos = now.unix_timestamp_nanos() / 1000 * 1000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(now)
    }
}

/// Test utilities.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// A clock that returns a strictly increasing instant on every query.
    ///
    /// Consecutive calls are one second apart, which makes creation order observable in tests
    /// without having to sleep.
    pub struct MonotonicClock {
        /// Seconds since the epoch to return on the next call.
        next_sec: AtomicI64,
    }

    impl MonotonicClock {
        /// Creates a new clock whose first reading is `start`, truncated to seconds.
        pub fn new(start: OffsetDateTime) -> Self {
            Self { next_sec: AtomicI64::new(start.unix_timestamp()) }
        }
    }

    impl Clock for MonotonicClock {
        fn now_utc(&self) -> OffsetDateTime {
            let now = self.next_sec.fetch_add(1, Ordering::SeqCst);
            OffsetDateTime::from_unix_timestamp(now).unwrap()
        }
    }

}
