#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

mod bindings {
  #![allow(unused)]
  #![allow(missing_docs)]

  include!(concat!(env!("OUT_DIR"), "/shim.rs"));
}

pub use bindings::*;

/// Task control block and stack handed to the kernel for one of its own tasks.
struct KernelTaskMemory<const STACK_SIZE: usize> {
  tcb: UnsafeCell<MaybeUninit<StaticTask_t>>,
  stack: UnsafeCell<[MaybeUninit<StackType_t>; STACK_SIZE]>,
}

// Only ever handed out once, to the kernel.
unsafe impl<const STACK_SIZE: usize> Sync for KernelTaskMemory<STACK_SIZE> {}

impl<const STACK_SIZE: usize> KernelTaskMemory<STACK_SIZE> {
  const fn new() -> Self {
    Self {
      tcb: UnsafeCell::new(MaybeUninit::uninit()),
      stack: UnsafeCell::new([MaybeUninit::uninit(); STACK_SIZE]),
    }
  }

  unsafe fn provide(
    &self,
    tcb_buffer: *mut *mut StaticTask_t,
    stack_buffer: *mut *mut StackType_t,
    stack_size: *mut u32,
  ) {
    *tcb_buffer = self.tcb.get().cast();
    *stack_buffer = self.stack.get().cast();
    // The stack size is given in words, not bytes.
    *stack_size = STACK_SIZE as u32;
  }
}

static IDLE_TASK_MEMORY: KernelTaskMemory<{ configMINIMAL_STACK_SIZE as usize }> = KernelTaskMemory::new();

#[no_mangle]
unsafe extern "C" fn vApplicationGetIdleTaskMemory(
  tcb_buffer: *mut *mut StaticTask_t,
  stack_buffer: *mut *mut StackType_t,
  stack_size: *mut u32,
) {
  IDLE_TASK_MEMORY.provide(tcb_buffer, stack_buffer, stack_size)
}

#[cfg(freertos_feature = "timers")]
static TIMER_TASK_MEMORY: KernelTaskMemory<{ configTIMER_TASK_STACK_DEPTH as usize }> = KernelTaskMemory::new();

#[cfg(freertos_feature = "timers")]
#[no_mangle]
unsafe extern "C" fn vApplicationGetTimerTaskMemory(
  tcb_buffer: *mut *mut StaticTask_t,
  stack_buffer: *mut *mut StackType_t,
  stack_size: *mut u32,
) {
  TIMER_TASK_MEMORY.provide(tcb_buffer, stack_buffer, stack_size)
}
