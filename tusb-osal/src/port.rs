//! The native kernel interface the OSAL forwards to.
//!
//! # Safety
//!
//! [`Port`] is an `unsafe trait` because the OSAL builds memory-safe abstractions on top of it:
//! queue operations copy exactly `item_size` bytes, statically allocated objects never outlive
//! their buffers and handles are only used between their creation and deletion.
//!
//! Functions taking a handle are `unsafe fn`; the caller guarantees the handle is live.

use core::ffi::{c_void, CStr};

/// Entry point of a task, called with the parameter given at creation.
pub type TaskFunction = extern "C" fn(*mut c_void);

/// Provides the kernel primitives used by the OSAL.
///
/// Each function corresponds to exactly one kernel call.
///
/// # Safety
///
/// See the [Safety](self#safety) section of the module documentation.
pub unsafe trait Port: Sized + 'static {
  /// Raw task handle.
  type TaskHandle: Copy;
  /// Raw queue handle.
  type QueueHandle: Copy;
  /// Raw semaphore (and mutex) handle.
  type SemaphoreHandle: Copy;
  /// Control block of a statically allocated queue.
  type QueueBuffer;
  /// Control block of a statically allocated semaphore or mutex.
  type SemaphoreBuffer;

  /// Scheduler tick frequency in Hertz.
  const TICK_RATE_HZ: u32;
  /// Tick count which blocks indefinitely.
  const MAX_DELAY: u32;
  /// Number of available task priorities.
  const MAX_PRIORITIES: u8;
  /// Minimal task stack size in words.
  const MINIMAL_STACK_SIZE: u16;

  /// Create a task. Returns `None` if the kernel could not allocate it.
  fn task_create(
    code: TaskFunction,
    name: &CStr,
    stack_depth: u16,
    param: *mut c_void,
    priority: u8,
  ) -> Option<Self::TaskHandle>;

  /// Block the calling task for `ticks`.
  fn task_delay(ticks: u32);

  /// Delete the calling task.
  fn task_delete_current();

  /// Request a context switch at the end of the current interrupt.
  fn yield_from_isr(higher_priority_task_woken: bool);

  /// Create a queue inside caller-provided storage.
  ///
  /// # Safety
  ///
  /// `storage` must hold `length * item_size` bytes and, like `buffer`, stay valid until the
  /// queue is deleted.
  unsafe fn queue_create_static(
    length: usize,
    item_size: usize,
    storage: *mut u8,
    buffer: *mut Self::QueueBuffer,
  ) -> Option<Self::QueueHandle>;

  /// Delete a queue.
  unsafe fn queue_delete(queue: Self::QueueHandle);

  /// Copy the item at the front of the queue to `item`, waiting up to `ticks`.
  unsafe fn queue_receive(queue: Self::QueueHandle, item: *mut c_void, ticks: u32) -> bool;

  /// Copy `item` to the back of the queue, waiting up to `ticks` for space.
  unsafe fn queue_send_to_back(queue: Self::QueueHandle, item: *const c_void, ticks: u32) -> bool;

  /// Copy `item` to the back of the queue from an interrupt service routine.
  unsafe fn queue_send_to_back_from_isr(
    queue: Self::QueueHandle,
    item: *const c_void,
    higher_priority_task_woken: &mut bool,
  ) -> bool;

  /// Discard all items in the queue.
  unsafe fn queue_reset(queue: Self::QueueHandle);

  /// Number of items in the queue.
  unsafe fn queue_messages_waiting(queue: Self::QueueHandle) -> usize;

  /// Create an empty binary semaphore inside caller-provided storage.
  ///
  /// # Safety
  ///
  /// `buffer` must stay valid until the semaphore is deleted.
  unsafe fn semaphore_create_binary_static(buffer: *mut Self::SemaphoreBuffer) -> Option<Self::SemaphoreHandle>;

  /// Create a priority-inheriting mutex on the kernel heap.
  fn mutex_create() -> Option<Self::SemaphoreHandle>;

  /// Create a priority-inheriting mutex inside caller-provided storage.
  ///
  /// # Safety
  ///
  /// `buffer` must stay valid until the mutex is deleted.
  unsafe fn mutex_create_static(buffer: *mut Self::SemaphoreBuffer) -> Option<Self::SemaphoreHandle>;

  /// Delete a semaphore or mutex.
  unsafe fn semaphore_delete(semaphore: Self::SemaphoreHandle);

  /// Give a semaphore or release a mutex.
  unsafe fn semaphore_give(semaphore: Self::SemaphoreHandle) -> bool;

  /// Give a semaphore from an interrupt service routine.
  unsafe fn semaphore_give_from_isr(semaphore: Self::SemaphoreHandle, higher_priority_task_woken: &mut bool) -> bool;

  /// Take a semaphore or lock a mutex, waiting up to `ticks`.
  unsafe fn semaphore_take(semaphore: Self::SemaphoreHandle, ticks: u32) -> bool;

  /// Take a semaphore from an interrupt service routine.
  unsafe fn semaphore_take_from_isr(semaphore: Self::SemaphoreHandle, higher_priority_task_woken: &mut bool) -> bool;
}
