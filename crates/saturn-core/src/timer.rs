// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Countdown Timer
//!
//! A cooperative wall-clock budget. The timer records its start instant and
//! a time limit; callers poll `is_expired` or `remaining` between discrete
//! steps of an anytime algorithm. Nothing is ever interrupted: a step that is
//! already running always finishes, even past the nominal deadline.
//!
//! An unlimited budget is expressed with `Duration::MAX`, which never
//! expires. A zero budget is expired from the start.
//!
//! ```rust
//! use saturn_core::timer::CountdownTimer;
//! use std::time::Duration;
//!
//! let timer = CountdownTimer::new(Duration::ZERO);
//! assert!(timer.is_expired());
//! assert_eq!(timer.remaining(), Duration::ZERO);
//!
//! let unlimited = CountdownTimer::unlimited();
//! assert!(!unlimited.is_expired());
//! ```

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTimer {
    start_time: Instant,
    time_limit: Duration,
}

impl CountdownTimer {
    /// Starts a timer that expires once `time_limit` has elapsed.
    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
        }
    }

    /// Starts a timer that never expires.
    #[inline]
    pub fn unlimited() -> Self {
        Self::new(Duration::MAX)
    }

    /// Starts a timer from a limit in seconds. Non-finite or huge values
    /// yield an unlimited timer, negative values an expired one.
    pub fn from_secs_f64(seconds: f64) -> Self {
        if seconds.is_nan() || seconds <= 0.0 {
            return Self::new(Duration::ZERO);
        }
        Self::new(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
    }

    /// Returns the configured time limit.
    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Returns `true` if the limit is `Duration::MAX`.
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.time_limit == Duration::MAX
    }

    /// Returns the time elapsed since the timer was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the time left until the limit, or zero once expired.
    #[inline]
    pub fn remaining(&self) -> Duration {
        self.time_limit.saturating_sub(self.elapsed())
    }

    /// Returns `true` once the elapsed time reached the limit.
    #[inline]
    pub fn is_expired(&self) -> bool {
        !self.is_unlimited() && self.elapsed() >= self.time_limit
    }
}

impl std::fmt::Display for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unlimited() {
            write!(f, "{:.3}s elapsed (unlimited)", self.elapsed().as_secs_f64())
        } else {
            write!(
                f,
                "{:.3}s elapsed of {:.3}s",
                self.elapsed().as_secs_f64(),
                self.time_limit.as_secs_f64()
            )
        }
    }
}
