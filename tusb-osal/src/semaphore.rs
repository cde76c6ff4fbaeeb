use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{InterruptContext, OsalError, Port, Result, Timeout};

/// Storage for a binary semaphore.
///
/// Usually placed in a `static`. A definition backs at most one live [`Semaphore`] at a time.
pub struct SemaphoreDef<P: Port> {
  buffer: UnsafeCell<MaybeUninit<P::SemaphoreBuffer>>,
  in_use: AtomicBool,
}

unsafe impl<P: Port> Sync for SemaphoreDef<P> {}

impl<P: Port> SemaphoreDef<P> {
  /// Create a new semaphore definition.
  #[allow(clippy::new_without_default)]
  pub const fn new() -> Self {
    Self { buffer: UnsafeCell::new(MaybeUninit::uninit()), in_use: AtomicBool::new(false) }
  }

  /// Create an empty binary semaphore inside this definition's storage.
  ///
  /// # Errors
  ///
  /// Returns [`OsalError::AlreadyCreated`] if a semaphore created from this definition is still alive.
  pub fn create(&self) -> Result<Semaphore<'_, P>> {
    if self.in_use.swap(true, Ordering::AcqRel) {
      return Err(OsalError::AlreadyCreated)
    }

    match unsafe { P::semaphore_create_binary_static(self.buffer.get().cast()) } {
      Some(handle) => Ok(Semaphore { handle, def: &self.in_use }),
      None => {
        self.in_use.store(false, Ordering::Release);
        log::warn!("failed to create semaphore");
        Err(OsalError::OutOfMemory)
      },
    }
  }
}

/// A binary semaphore created from a [`SemaphoreDef`].
///
/// Dropping the semaphore deletes it and frees the definition for reuse.
pub struct Semaphore<'d, P: Port> {
  handle: P::SemaphoreHandle,
  def: &'d AtomicBool,
}

unsafe impl<P: Port> Send for Semaphore<'_, P> {}
unsafe impl<P: Port> Sync for Semaphore<'_, P> {}

impl<P: Port> fmt::Debug for Semaphore<'_, P>
where
  P::SemaphoreHandle: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Semaphore").field(&self.handle).finish()
  }
}

impl<P: Port> Semaphore<'_, P> {
  /// Get the raw semaphore handle.
  pub fn handle(&self) -> P::SemaphoreHandle {
    self.handle
  }

  /// Post the semaphore.
  ///
  /// # Errors
  ///
  /// Returns [`OsalError::AlreadyPosted`] if the semaphore was posted and not yet taken.
  #[inline]
  pub fn post(&self) -> Result<()> {
    if unsafe { P::semaphore_give(self.handle) } {
      Ok(())
    } else {
      Err(OsalError::AlreadyPosted)
    }
  }

  /// Post the semaphore from within an interrupt service routine.
  #[inline]
  pub fn post_isr(&self, ic: &mut InterruptContext<P>) -> Result<()> {
    if unsafe { P::semaphore_give_from_isr(self.handle, ic.woken_mut()) } {
      Ok(())
    } else {
      Err(OsalError::AlreadyPosted)
    }
  }

  /// Wait for the semaphore to be posted and take it.
  #[inline]
  pub fn wait(&self, timeout: impl Into<Timeout>) -> Result<()> {
    if unsafe { P::semaphore_take(self.handle, timeout.into().to_ticks::<P>()) } {
      Ok(())
    } else {
      log::trace!("semaphore wait timed out");
      Err(OsalError::Timeout)
    }
  }

  /// Take the semaphore if it is posted, from within an interrupt service routine.
  ///
  /// Resetting a semaphore which is not posted does nothing.
  #[inline]
  pub fn reset_isr(&self, ic: &mut InterruptContext<P>) {
    let _ = unsafe { P::semaphore_take_from_isr(self.handle, ic.woken_mut()) };
  }
}

impl<P: Port> Drop for Semaphore<'_, P> {
  fn drop(&mut self) {
    unsafe { P::semaphore_delete(self.handle) }
    self.def.store(false, Ordering::Release);
  }
}
