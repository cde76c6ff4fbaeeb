use core::time::Duration;

use crate::Port;

/// Timeout of a blocking operation in milliseconds.
///
/// All blocking operations accept any type which can be converted to
/// `Timeout`, in particular plain milliseconds as `u32` and [`Duration`]:
///
/// - [`Timeout::NO_WAIT`] makes an operation non-blocking.
/// - [`Timeout::WAIT_FOREVER`] blocks until the operation completes. This is
///   true for any `Duration` of at least `u32::MAX` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Timeout {
  ms: u32,
}

impl Timeout {
  /// Return immediately.
  pub const NO_WAIT: Self = Self::from_millis(0);
  /// Timeout used by the stack for ordinary control operations.
  pub const NORMAL: Self = Self::from_millis(10);
  /// Block until the operation completes.
  pub const WAIT_FOREVER: Self = Self::from_millis(u32::MAX);

  /// Create a `Timeout` from milliseconds.
  ///
  /// `u32::MAX` is the [`WAIT_FOREVER`](Self::WAIT_FOREVER) sentinel.
  pub const fn from_millis(ms: u32) -> Self {
    Self { ms }
  }

  /// Get the timeout in milliseconds.
  pub const fn as_millis(&self) -> u32 {
    self.ms
  }

  /// Whether this is the [`WAIT_FOREVER`](Self::WAIT_FOREVER) sentinel.
  pub const fn is_forever(&self) -> bool {
    self.ms == u32::MAX
  }

  /// Convert to scheduler ticks of the given port.
  pub const fn to_ticks<P: Port>(self) -> u32 {
    if self.is_forever() {
      P::MAX_DELAY
    } else {
      ms_to_ticks(self.ms, P::TICK_RATE_HZ, P::MAX_DELAY)
    }
  }
}

/// Convert milliseconds to ticks, rounding down like `pdMS_TO_TICKS`.
///
/// The result saturates just below `max_delay` so a finite timeout stays finite.
pub(crate) const fn ms_to_ticks(ms: u32, tick_rate_hz: u32, max_delay: u32) -> u32 {
  let ticks = ms as u64 * tick_rate_hz as u64 / 1000;
  let limit = max_delay as u64 - 1;

  if ticks > limit {
    limit as u32
  } else {
    ticks as u32
  }
}

impl From<u32> for Timeout {
  fn from(ms: u32) -> Self {
    Self::from_millis(ms)
  }
}

impl From<Duration> for Timeout {
  /// Convert a `Duration` to a `Timeout`, saturating at [`WAIT_FOREVER`](Self::WAIT_FOREVER).
  fn from(duration: Duration) -> Self {
    Self::from_millis(duration.as_millis().try_into().unwrap_or(u32::MAX))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ms_to_ticks_rounds_down() {
    assert_eq!(ms_to_ticks(10, 1000, u32::MAX), 10);
    assert_eq!(ms_to_ticks(10, 100, u32::MAX), 1);
    assert_eq!(ms_to_ticks(9, 100, u32::MAX), 0);
    assert_eq!(ms_to_ticks(1500, 250, u32::MAX), 375);
  }

  #[test]
  fn ms_to_ticks_does_not_overflow() {
    assert_eq!(ms_to_ticks(4_000_000, 10_000, u32::MAX), 40_000_000);
  }

  #[test]
  fn finite_timeout_stays_below_max_delay() {
    assert_eq!(ms_to_ticks(u32::MAX - 1, 1000, u32::MAX), u32::MAX - 1);
    assert_eq!(ms_to_ticks(70_000, 1000, u16::MAX as u32), u16::MAX as u32 - 1);
  }

  #[test]
  fn duration_max_is_wait_forever() {
    assert_eq!(Timeout::from(Duration::MAX), Timeout::WAIT_FOREVER);
    assert!(Timeout::from(Duration::from_millis(u32::MAX as u64)).is_forever());
  }

  #[test]
  fn duration_truncates_to_millis() {
    assert_eq!(Timeout::from(Duration::from_micros(2_999)), Timeout::from_millis(2));
    assert_eq!(Timeout::from(Duration::ZERO), Timeout::NO_WAIT);
  }
}
