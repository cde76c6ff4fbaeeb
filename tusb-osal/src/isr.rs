use core::marker::PhantomData;

use crate::Port;

/// Token proving the caller runs inside an interrupt handler.
///
/// Every `*_isr` operation records in it whether a task of higher priority than the interrupted
/// one became ready. Create one on entry to the handler and let it drop on exit: dropping it
/// requests the context switch (`portYIELD_FROM_ISR`) if one is due.
#[must_use]
pub struct InterruptContext<P: Port> {
  higher_priority_task_woken: bool,
  // An `InterruptContext` is only valid in the ISR it is created.
  _port: PhantomData<*mut P>,
}

impl<P: Port> InterruptContext<P> {
  /// Enter interrupt context. Only call this from an interrupt handler.
  #[allow(clippy::new_without_default)]
  pub fn new() -> Self {
    Self { higher_priority_task_woken: false, _port: PhantomData }
  }

  /// Whether an operation in this context unblocked a task with a higher priority than the
  /// interrupted one.
  pub fn higher_priority_task_woken(&self) -> bool {
    self.higher_priority_task_woken
  }

  pub(crate) fn woken_mut(&mut self) -> &mut bool {
    &mut self.higher_priority_task_woken
  }
}

impl<P: Port> Drop for InterruptContext<P> {
  fn drop(&mut self) {
    P::yield_from_isr(self.higher_priority_task_woken)
  }
}
