//! Mutexes with priority inheritance.
//!
//! A task blocked on a mutex temporarily raises the priority of the holder to its own. The
//! inheritance itself is implemented by the kernel.

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{OsalError, Port, Result, Timeout};

/// Storage for a statically allocated mutex.
///
/// Usually placed in a `static`. A definition backs at most one live [`Mutex`] at a time.
pub struct MutexDef<P: Port> {
  buffer: UnsafeCell<MaybeUninit<P::SemaphoreBuffer>>,
  in_use: AtomicBool,
}

unsafe impl<P: Port> Sync for MutexDef<P> {}

impl<P: Port> MutexDef<P> {
  /// Create a new mutex definition.
  #[allow(clippy::new_without_default)]
  pub const fn new() -> Self {
    Self { buffer: UnsafeCell::new(MaybeUninit::uninit()), in_use: AtomicBool::new(false) }
  }

  /// Create an unlocked mutex inside this definition's storage.
  ///
  /// # Errors
  ///
  /// Returns [`OsalError::AlreadyCreated`] if a mutex created from this definition is still alive.
  pub fn create(&self) -> Result<Mutex<'_, P>> {
    if self.in_use.swap(true, Ordering::AcqRel) {
      return Err(OsalError::AlreadyCreated)
    }

    match unsafe { P::mutex_create_static(self.buffer.get().cast()) } {
      Some(handle) => Ok(Mutex { handle, def: Some(&self.in_use), _port: PhantomData }),
      None => {
        self.in_use.store(false, Ordering::Release);
        log::warn!("failed to create mutex");
        Err(OsalError::OutOfMemory)
      },
    }
  }
}

/// A mutex with priority inheritance.
///
/// Dropping the mutex deletes it.
pub struct Mutex<'d, P: Port> {
  handle: P::SemaphoreHandle,
  def: Option<&'d AtomicBool>,
  _port: PhantomData<P>,
}

unsafe impl<P: Port> Send for Mutex<'_, P> {}
unsafe impl<P: Port> Sync for Mutex<'_, P> {}

impl<P: Port> fmt::Debug for Mutex<'_, P>
where
  P::SemaphoreHandle: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Mutex").field(&self.handle).finish()
  }
}

impl<P: Port> Mutex<'static, P> {
  /// Create an unlocked mutex on the kernel heap.
  pub fn new() -> Result<Self> {
    match P::mutex_create() {
      Some(handle) => Ok(Self { handle, def: None, _port: PhantomData }),
      None => {
        log::warn!("failed to create mutex");
        Err(OsalError::OutOfMemory)
      },
    }
  }
}

impl<P: Port> Mutex<'_, P> {
  /// Get the raw mutex handle.
  pub fn handle(&self) -> P::SemaphoreHandle {
    self.handle
  }

  /// Wait for the mutex and lock it.
  ///
  /// The lock must be released with [`release`](Self::release) by the same task.
  #[inline]
  pub fn wait(&self, timeout: impl Into<Timeout>) -> Result<()> {
    if unsafe { P::semaphore_take(self.handle, timeout.into().to_ticks::<P>()) } {
      Ok(())
    } else {
      log::trace!("mutex wait timed out");
      Err(OsalError::Timeout)
    }
  }

  /// Release the mutex.
  ///
  /// # Errors
  ///
  /// Returns [`OsalError::NotOwner`] if the calling task does not hold the mutex.
  #[inline]
  pub fn release(&self) -> Result<()> {
    if unsafe { P::semaphore_give(self.handle) } {
      Ok(())
    } else {
      Err(OsalError::NotOwner)
    }
  }

  /// Lock the mutex in RAII fashion, waiting up to `timeout`.
  pub fn lock(&self, timeout: impl Into<Timeout>) -> Result<MutexGuard<'_, P>> {
    self.wait(timeout)?;
    Ok(MutexGuard { handle: self.handle, _port: PhantomData })
  }
}

impl<P: Port> Drop for Mutex<'_, P> {
  fn drop(&mut self) {
    unsafe { P::semaphore_delete(self.handle) }

    if let Some(def) = self.def {
      def.store(false, Ordering::Release);
    }
  }
}

/// An RAII implementation of a “scoped lock” of a mutex.
///
/// When this structure is dropped (falls out of scope), the mutex is released.
#[must_use = "if unused the `Mutex` will be released again immediately"]
pub struct MutexGuard<'m, P: Port> {
  handle: P::SemaphoreHandle,
  // Must be released by the locking task.
  _port: PhantomData<(&'m (), *const P)>,
}

impl<P: Port> Drop for MutexGuard<'_, P> {
  fn drop(&mut self) {
    let _ = unsafe { P::semaphore_give(self.handle) };
  }
}
