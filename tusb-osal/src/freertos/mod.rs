//! FreeRTOS port.
//!
//! Most of the FreeRTOS API consists of macros, so every call goes through a function in the C
//! shim (`shim.c`) which is compiled together with the kernel.

use core::ffi::{c_void, CStr};

use crate::port::{Port, TaskFunction};

mod shim;
use shim::*;

/// Raw task handle.
pub type TaskHandle_t = shim::TaskHandle_t;

/// Raw queue handle.
pub type QueueHandle_t = shim::QueueHandle_t;

/// Raw semaphore handle.
pub type SemaphoreHandle_t = shim::SemaphoreHandle_t;

/// The FreeRTOS kernel.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct FreeRtos;

impl FreeRtos {
  /// Start the scheduler. Only returns if the scheduler is stopped with
  /// [`end_scheduler`](Self::end_scheduler) on ports which support it.
  pub fn start_scheduler() {
    unsafe { tusb_osal_start_scheduler() }
  }

  /// Stop the scheduler.
  ///
  /// # Safety
  ///
  /// Only supported by some ports, e.g. the POSIX port.
  pub unsafe fn end_scheduler() {
    tusb_osal_end_scheduler()
  }
}

fn non_null<T>(ptr: *mut T) -> Option<*mut T> {
  (!ptr.is_null()).then_some(ptr)
}

fn merge_woken(x_higher_priority_task_woken: BaseType_t, higher_priority_task_woken: &mut bool) {
  *higher_priority_task_woken |= x_higher_priority_task_woken != pdFALSE;
}

// Ticks cross the `Port` boundary as `u32`, so `portMAX_DELAY` must survive the round trip.
const _: () = assert!(core::mem::size_of::<TickType_t>() <= core::mem::size_of::<u32>());

unsafe impl Port for FreeRtos {
  type TaskHandle = TaskHandle_t;
  type QueueHandle = QueueHandle_t;
  type SemaphoreHandle = SemaphoreHandle_t;
  type QueueBuffer = StaticQueue_t;
  type SemaphoreBuffer = StaticSemaphore_t;

  const TICK_RATE_HZ: u32 = configTICK_RATE_HZ as u32;
  const MAX_DELAY: u32 = portMAX_DELAY as u32;
  const MAX_PRIORITIES: u8 = configMAX_PRIORITIES as u8;
  const MINIMAL_STACK_SIZE: u16 = configMINIMAL_STACK_SIZE;

  fn task_create(
    code: TaskFunction,
    name: &CStr,
    stack_depth: u16,
    param: *mut c_void,
    priority: u8,
  ) -> Option<Self::TaskHandle> {
    let code: unsafe extern "C" fn(*mut c_void) = code;

    let mut ptr = core::ptr::null_mut();
    let res = unsafe {
      tusb_osal_task_create(Some(code), name.as_ptr(), stack_depth, param, priority.into(), &mut ptr)
    };

    match res {
      pdPASS => non_null(ptr),
      _ => None,
    }
  }

  fn task_delay(ticks: u32) {
    unsafe { tusb_osal_task_delay(ticks as TickType_t) }
  }

  fn task_delete_current() {
    unsafe { tusb_osal_task_delete_current() }
  }

  fn yield_from_isr(higher_priority_task_woken: bool) {
    unsafe { tusb_osal_yield_from_isr(if higher_priority_task_woken { pdTRUE } else { pdFALSE }) }
  }

  unsafe fn queue_create_static(
    length: usize,
    item_size: usize,
    storage: *mut u8,
    buffer: *mut Self::QueueBuffer,
  ) -> Option<Self::QueueHandle> {
    non_null(tusb_osal_queue_create_static(length as UBaseType_t, item_size as UBaseType_t, storage, buffer))
  }

  unsafe fn queue_delete(queue: Self::QueueHandle) {
    tusb_osal_queue_delete(queue)
  }

  unsafe fn queue_receive(queue: Self::QueueHandle, item: *mut c_void, ticks: u32) -> bool {
    tusb_osal_queue_receive(queue, item, ticks as TickType_t) == pdTRUE
  }

  unsafe fn queue_send_to_back(queue: Self::QueueHandle, item: *const c_void, ticks: u32) -> bool {
    tusb_osal_queue_send_to_back(queue, item, ticks as TickType_t) == pdTRUE
  }

  unsafe fn queue_send_to_back_from_isr(
    queue: Self::QueueHandle,
    item: *const c_void,
    higher_priority_task_woken: &mut bool,
  ) -> bool {
    let mut x_higher_priority_task_woken = pdFALSE;
    let res = tusb_osal_queue_send_to_back_from_isr(queue, item, &mut x_higher_priority_task_woken);
    merge_woken(x_higher_priority_task_woken, higher_priority_task_woken);
    res == pdTRUE
  }

  unsafe fn queue_reset(queue: Self::QueueHandle) {
    tusb_osal_queue_reset(queue)
  }

  unsafe fn queue_messages_waiting(queue: Self::QueueHandle) -> usize {
    tusb_osal_queue_messages_waiting(queue) as usize
  }

  unsafe fn semaphore_create_binary_static(buffer: *mut Self::SemaphoreBuffer) -> Option<Self::SemaphoreHandle> {
    non_null(tusb_osal_semaphore_create_binary_static(buffer))
  }

  fn mutex_create() -> Option<Self::SemaphoreHandle> {
    non_null(unsafe { tusb_osal_mutex_create() })
  }

  unsafe fn mutex_create_static(buffer: *mut Self::SemaphoreBuffer) -> Option<Self::SemaphoreHandle> {
    non_null(tusb_osal_mutex_create_static(buffer))
  }

  unsafe fn semaphore_delete(semaphore: Self::SemaphoreHandle) {
    tusb_osal_semaphore_delete(semaphore)
  }

  unsafe fn semaphore_give(semaphore: Self::SemaphoreHandle) -> bool {
    tusb_osal_semaphore_give(semaphore) == pdTRUE
  }

  unsafe fn semaphore_give_from_isr(semaphore: Self::SemaphoreHandle, higher_priority_task_woken: &mut bool) -> bool {
    let mut x_higher_priority_task_woken = pdFALSE;
    let res = tusb_osal_semaphore_give_from_isr(semaphore, &mut x_higher_priority_task_woken);
    merge_woken(x_higher_priority_task_woken, higher_priority_task_woken);
    res == pdTRUE
  }

  unsafe fn semaphore_take(semaphore: Self::SemaphoreHandle, ticks: u32) -> bool {
    tusb_osal_semaphore_take(semaphore, ticks as TickType_t) == pdTRUE
  }

  unsafe fn semaphore_take_from_isr(semaphore: Self::SemaphoreHandle, higher_priority_task_woken: &mut bool) -> bool {
    let mut x_higher_priority_task_woken = pdFALSE;
    let res = tusb_osal_semaphore_take_from_isr(semaphore, &mut x_higher_priority_task_woken);
    merge_woken(x_higher_priority_task_woken, higher_priority_task_woken);
    res == pdTRUE
  }
}
