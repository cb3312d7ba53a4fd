//! Monotonic clock abstractions shared by host and firmware targets.
//!
//! The bridge never reads a clock itself; the owning poll loop samples one
//! instant per cycle and threads it through every update call. Targets plug
//! in their own instant type (an embassy `Instant`, a host `std::time`
//! wrapper, or [`MillisInstant`] for tests and the emulator) by implementing
//! [`MonotonicInstant`].

use core::ops::Add;
use core::time::Duration;

/// Trait implemented by copyable monotonic instant wrappers.
pub trait MonotonicInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Canonical millisecond-resolution instant for hosts and tests.
///
/// Wraps milliseconds elapsed since an arbitrary session epoch, mirroring the
/// `millis()` counter the telemetry host exposes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct MillisInstant(u64);

impl MillisInstant {
    /// Wraps a raw millisecond counter value.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }
}

impl MonotonicInstant for MillisInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for MillisInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let millis = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}
