//! Statically allocated message queues.
//!
//! Items are copied into and out of the queue, so they must be [`Copy`].

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{InterruptContext, OsalError, Port, Result, Timeout};

/// Storage for a queue of up to `SIZE` items of type `T`.
///
/// Usually placed in a `static`. A definition backs at most one live [`Queue`] at a time.
pub struct QueueDef<T, const SIZE: usize, P: Port> {
  pool: UnsafeCell<MaybeUninit<[T; SIZE]>>,
  buffer: UnsafeCell<MaybeUninit<P::QueueBuffer>>,
  in_use: AtomicBool,
}

unsafe impl<T: Send, const SIZE: usize, P: Port> Sync for QueueDef<T, SIZE, P> {}

impl<T: Copy + Send, const SIZE: usize, P: Port> QueueDef<T, SIZE, P> {
  /// Create a new queue definition.
  #[allow(clippy::new_without_default)]
  pub const fn new() -> Self {
    Self {
      pool: UnsafeCell::new(MaybeUninit::uninit()),
      buffer: UnsafeCell::new(MaybeUninit::uninit()),
      in_use: AtomicBool::new(false),
    }
  }

  /// Create the queue inside this definition's storage.
  ///
  /// # Errors
  ///
  /// Returns [`OsalError::AlreadyCreated`] if a queue created from this definition is still alive.
  pub fn create(&self) -> Result<Queue<'_, T, P>> {
    if self.in_use.swap(true, Ordering::AcqRel) {
      return Err(OsalError::AlreadyCreated)
    }

    let handle = unsafe {
      P::queue_create_static(
        SIZE,
        mem::size_of::<T>(),
        self.pool.get().cast(),
        self.buffer.get().cast(),
      )
    };

    match handle {
      Some(handle) => Ok(Queue { handle, def: &self.in_use, _item: PhantomData }),
      None => {
        self.in_use.store(false, Ordering::Release);
        log::warn!("failed to create queue of {} items", SIZE);
        Err(OsalError::OutOfMemory)
      },
    }
  }
}

/// A fixed-size queue created from a [`QueueDef`].
///
/// Dropping the queue deletes it and frees the definition for reuse.
pub struct Queue<'d, T, P: Port> {
  handle: P::QueueHandle,
  def: &'d AtomicBool,
  _item: PhantomData<T>,
}

unsafe impl<T: Send, P: Port> Send for Queue<'_, T, P> {}
unsafe impl<T: Send, P: Port> Sync for Queue<'_, T, P> {}

impl<T, P: Port> fmt::Debug for Queue<'_, T, P>
where
  P::QueueHandle: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Queue").field(&self.handle).finish()
  }
}

impl<T: Copy + Send, P: Port> Queue<'_, T, P> {
  /// Get the raw queue handle.
  pub fn handle(&self) -> P::QueueHandle {
    self.handle
  }

  /// Wait for an item to be available on the queue.
  #[inline]
  pub fn receive(&self, timeout: impl Into<Timeout>) -> Result<T> {
    let mut item = MaybeUninit::<T>::uninit();

    if unsafe { P::queue_receive(self.handle, item.as_mut_ptr().cast(), timeout.into().to_ticks::<P>()) } {
      Ok(unsafe { item.assume_init() })
    } else {
      log::trace!("queue receive timed out");
      Err(OsalError::Timeout)
    }
  }

  /// Send an item to the end of the queue. Wait as long as it takes for the queue to have empty
  /// space for it.
  #[inline]
  pub fn send(&self, item: &T) -> Result<()> {
    self.send_timeout(item, Timeout::WAIT_FOREVER)
  }

  /// Send an item to the end of the queue. Wait up to `timeout` for the queue to have empty space
  /// for it.
  ///
  /// # Errors
  ///
  /// Returns [`OsalError::QueueFull`] if the timeout rounds down to zero ticks and the queue is
  /// full, [`OsalError::Timeout`] if a real wait expired.
  pub fn send_timeout(&self, item: &T, timeout: impl Into<Timeout>) -> Result<()> {
    let ticks = timeout.into().to_ticks::<P>();

    if unsafe { P::queue_send_to_back(self.handle, ptr::from_ref(item).cast(), ticks) } {
      return Ok(())
    }

    // Anything shorter than a tick was a single non-blocking attempt.
    if ticks == 0 {
      Err(OsalError::QueueFull)
    } else {
      log::trace!("queue send timed out");
      Err(OsalError::Timeout)
    }
  }

  /// Send an item to the end of the queue, from an interrupt.
  #[inline]
  pub fn send_isr(&self, ic: &mut InterruptContext<P>, item: &T) -> Result<()> {
    if unsafe { P::queue_send_to_back_from_isr(self.handle, ptr::from_ref(item).cast(), ic.woken_mut()) } {
      Ok(())
    } else {
      Err(OsalError::QueueFull)
    }
  }

  /// Discard all items in the queue.
  ///
  /// Must be called from task context.
  pub fn flush(&self) {
    unsafe { P::queue_reset(self.handle) }
  }

  /// Get the number of items in the queue.
  pub fn len(&self) -> usize {
    unsafe { P::queue_messages_waiting(self.handle) }
  }

  /// Whether the queue holds no items.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<T, P: Port> Drop for Queue<'_, T, P> {
  fn drop(&mut self) {
    unsafe { P::queue_delete(self.handle) }
    self.def.store(false, Ordering::Release);
  }
}
