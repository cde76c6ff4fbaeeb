use core::marker::PhantomData;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::{task, Port, Timeout};

/// Blocking delay which suspends the calling task.
///
/// The kernel only schedules in whole ticks, so delays are rounded down to
/// ticks and microseconds are rounded up to whole milliseconds.
pub struct Delay<P: Port> {
  _port: PhantomData<P>,
}

impl<P: Port> Delay<P> {
  /// Create a new delay provider.
  pub const fn new() -> Self {
    Self { _port: PhantomData }
  }
}

impl<P: Port> Default for Delay<P> {
  fn default() -> Self {
    Self::new()
  }
}

impl<P: Port> DelayMs<u32> for Delay<P> {
  fn delay_ms(&mut self, ms: u32) {
    // `u32::MAX` is a regular delay here, not `Timeout::WAIT_FOREVER`.
    task::delay::<P>(Timeout::from_millis(ms.min(u32::MAX - 1)))
  }
}

impl<P: Port> DelayMs<u16> for Delay<P> {
  fn delay_ms(&mut self, ms: u16) {
    self.delay_ms(u32::from(ms))
  }
}

impl<P: Port> DelayMs<u8> for Delay<P> {
  fn delay_ms(&mut self, ms: u8) {
    self.delay_ms(u32::from(ms))
  }
}

impl<P: Port> DelayUs<u32> for Delay<P> {
  fn delay_us(&mut self, us: u32) {
    self.delay_ms(us.div_ceil(1000))
  }
}
