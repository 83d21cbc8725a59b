// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Millisecond timestamps for the consensus timers.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
pub use error::TimeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// An instant, or the span between two of them, in milliseconds since
/// 01/01/1970.
///
/// Every consensus timer is built on this type: ask throttles compare
/// `now.saturating_sub(last_ask)` against their interval, fault timers sit
/// at [`QuillTime::ZERO`] while a leader is healthy, and the replay window
/// keeps a hash while `timestamp.abs_diff(now)` stays inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuillTime(u64);

impl fmt::Display for QuillTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl QuillTime {
    /// The zero instant. Timers hold it while disarmed.
    ///
    /// ```
    /// # use quill_time::QuillTime;
    /// let when_faulted = QuillTime::ZERO;
    /// assert!(when_faulted.is_zero());
    /// ```
    pub const ZERO: QuillTime = QuillTime(0);

    /// An instant or interval from raw milliseconds.
    ///
    /// ```
    /// # use quill_time::QuillTime;
    /// let ask_interval = QuillTime::from_millis(2000);
    /// assert_eq!(ask_interval.to_millis(), 2000);
    /// ```
    pub const fn from_millis(value: u64) -> Self {
        QuillTime(value)
    }

    /// Reads the wall clock, millisecond resolution.
    ///
    /// The worker reads it once per tick and shares the snapshot, so every
    /// timer decision inside one tick observes the same instant.
    pub fn now() -> Result<Self, TimeError> {
        let now: u64 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::ClockSourceError)?
            .as_millis()
            .try_into()
            .map_err(|_| TimeError::ClockSourceError)?;
        Ok(QuillTime(now))
    }

    /// Raw milliseconds.
    pub const fn to_millis(self) -> u64 {
        self.0
    }

    /// Whole seconds, truncating. Acknowledgement staleness is judged at
    /// second granularity.
    ///
    /// ```
    /// # use quill_time::QuillTime;
    /// assert_eq!(QuillTime::from_millis(120_999).to_seconds(), 120);
    /// ```
    pub const fn to_seconds(self) -> u64 {
        self.0 / 1000
    }

    /// Whether this is the disarmed-timer value.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Conversion for `std` sleep and deadline APIs.
    pub fn to_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Milliseconds elapsed from `earlier` up to `self`; zero when
    /// `earlier` has not happened yet.
    ///
    /// ```
    /// # use quill_time::QuillTime;
    /// let last_ask = QuillTime::from_millis(10_000);
    /// let now = QuillTime::from_millis(10_500);
    /// // 500 ms since the last request: inside a 2000 ms throttle
    /// assert!(now.saturating_sub(last_ask) < QuillTime::from_millis(2000));
    /// assert_eq!(last_ask.saturating_sub(now), QuillTime::ZERO);
    /// ```
    #[must_use]
    pub fn saturating_sub(self, t: QuillTime) -> Self {
        QuillTime(self.0.saturating_sub(t.0))
    }

    /// Advance an instant without risking wraparound.
    ///
    /// ```
    /// # use quill_time::QuillTime;
    /// let now = QuillTime::from_millis(10_000);
    /// assert_eq!(now.saturating_add(QuillTime::from_millis(500)).to_millis(), 10_500);
    /// ```
    #[must_use]
    pub fn saturating_add(self, t: QuillTime) -> Self {
        QuillTime(self.0.saturating_add(t.0))
    }

    /// Span between two instants, whichever came first.
    ///
    /// ```
    /// # use quill_time::QuillTime;
    /// let stamped = QuillTime::from_millis(9_000);
    /// let now = QuillTime::from_millis(10_000);
    /// // a peer's clock may run ahead of ours, the window tolerates both
    /// assert_eq!(stamped.abs_diff(now), now.abs_diff(stamped));
    /// ```
    pub fn abs_diff(&self, t: QuillTime) -> QuillTime {
        QuillTime(self.0.abs_diff(t.0))
    }
}
