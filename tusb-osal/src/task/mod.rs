//! Task creation and delays.
//!
//! # Examples
//!
//! ```ignore
//! use tusb_osal::{task, FreeRtos, Task, TaskPriority, Timeout};
//!
//! Task::<FreeRtos>::new()
//!   .name("usbd")
//!   .priority(TaskPriority::new(3))
//!   .start(|| loop {
//!     task::delay::<FreeRtos>(Timeout::from_millis(1));
//!   })
//!   .unwrap();
//! ```

use core::fmt;
use core::marker::PhantomData;

use crate::{Port, Timeout};

mod builder;
pub use builder::TaskBuilder;
mod name;
pub use name::TaskName;
mod priority;
pub use priority::TaskPriority;

/// A running task.
pub struct Task<P: Port> {
  handle: P::TaskHandle,
  _port: PhantomData<P>,
}

unsafe impl<P: Port> Send for Task<P> {}
unsafe impl<P: Port> Sync for Task<P> {}

impl<P: Port> Task<P> {
  /// Prepare a builder object for the new task.
  #[allow(clippy::new_ret_no_self)]
  pub const fn new() -> TaskBuilder<'static, P> {
    TaskBuilder::new()
  }

  /// Get the raw task handle.
  pub fn handle(&self) -> P::TaskHandle {
    self.handle
  }
}

impl<P: Port> fmt::Debug for Task<P>
where
  P::TaskHandle: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Task").field(&self.handle).finish()
  }
}

/// Block the calling task for the given time.
///
/// [`Timeout::WAIT_FOREVER`] blocks for the kernel's maximum delay.
#[inline]
pub fn delay<P: Port>(timeout: impl Into<Timeout>) {
  P::task_delay(timeout.into().to_ticks::<P>())
}
