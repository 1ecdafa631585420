// Autograder
// Copyright 2026 The Autograder Authors
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

use async_trait::async_trait;
use std::time::Duration;
use time::OffsetDateTime;

/// Generic definition of a clock.
#[async_trait]
pub trait Clock {
    /// Returns the current UTC time.
    fn now_utc(&self) -> OffsetDateTime;

    /// Pauses execution of the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock implementation that uses the system clock.
#[derive(Clone, Default)]
pub struct SystemClock {}

#[async_trait]
impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();

        // Truncate the timestamp to millisecond resolution because this is the resolution of the
        // timestamps we hand out in API envelopes and metrics.  We could do this at serialization
        // time instead, but then we would get some strange behavior throughout the program.
        // Better be consistent.
        let nanos = nanos / 1_000_000 * 1_000_000;

        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .expect("nanos must be in range because they come from the current timestamp")
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// A clock that returns a preconfigured instant and that can be modified at will.
    ///
    /// Only supports millisecond-level precision.
    pub struct SettableClock {
        /// Current fake time in milliseconds.
        now_ms: AtomicU64,
    }

    impl SettableClock {
        /// Creates a new clock that returns `now` until reconfigured with `set`.
        pub fn new(now: OffsetDateTime) -> Self {
            let now_ns = now.unix_timestamp_nanos();
            assert!(now_ns % 1_000_000 == 0, "Sub-millisecond precision not supported");
            let now_ms = u64::try_from(now_ns / 1_000_000).unwrap();
            Self { now_ms: AtomicU64::new(now_ms) }
        }

        /// Sets the new value of `now` that the clock returns.
        pub fn set(&self, now: OffsetDateTime) {
            let now_ns = now.unix_timestamp_nanos();
            assert!(now_ns % 1_000_000 == 0, "Sub-millisecond precision not supported");
            let now_ms = u64::try_from(now_ns / 1_000_000).unwrap();
            self.now_ms.store(now_ms, Ordering::SeqCst);
        }

        /// Advances the current time by `delta`.
        pub fn advance(&self, delta: Duration) {
            let delta_ns = delta.as_nanos();
            assert!(delta_ns % 1_000_000 == 0, "Sub-millisecond precision not supported");
            let delta_ms = u64::try_from(delta_ns / 1_000_000).unwrap();
            self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            let now_ms = self.now_ms.load(Ordering::SeqCst);
            OffsetDateTime::from_unix_timestamp_nanos(now_ms as i128 * 1_000_000).unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.advance(duration);
            tokio::task::yield_now().await;
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use time::macros::datetime;

        #[test]
        fn test_settableclock_millisecond_precision_supported() {
            let now = datetime!(2026-02-14 10:15:00.123 UTC);
            let clock = SettableClock::new(now);
            assert_eq!(now, clock.now_utc());
        }

        #[test]
        fn test_settableclock_set_and_advance() {
            let clock = SettableClock::new(datetime!(2026-02-14 10:15:00 UTC));
            clock.set(datetime!(2026-02-14 11:00:00 UTC));
            clock.advance(Duration::from_millis(1500));
            assert_eq!(datetime!(2026-02-14 11:00:01.5 UTC), clock.now_utc());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_systemclock_trivial_properties() {
        let clock = SystemClock::default();
        let now1 = clock.now_utc();
        let now2 = clock.now_utc();
        assert!(now1 <= now2);
        assert_eq!(0, now1.unix_timestamp_nanos() % 1_000_000);
    }
}
