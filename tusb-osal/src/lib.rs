//! # USB stack OSAL for FreeRTOS
//!
//! Operating system abstraction layer of a USB device/host stack. The stack only needs a handful
//! of primitives from its host operating system: tasks, message queues, binary semaphores and
//! priority-inheriting mutexes. This crate maps them onto FreeRTOS.
//!
//! Every operation forwards to a single kernel call and only translates units:
//!
//! - timeouts are given in milliseconds and converted to scheduler ticks,
//! - [`Timeout::WAIT_FOREVER`] becomes `portMAX_DELAY`,
//! - boolean kernel results become [`OsalError`]s.
//!
//! The kernel primitives are reached through the [`Port`] trait. The [`FreeRtos`] port is
//! available when the kernel is built along with this crate, i.e. when `FREERTOS_SRC` points to
//! the FreeRTOS kernel sources and `FREERTOS_CONFIG` to the directory containing
//! `FreeRTOSConfig.h`. The configuration must enable `configSUPPORT_STATIC_ALLOCATION` and
//! `configUSE_MUTEXES`.
//!
//! # Samples
//!
//! Spawning a task
//!
//! ```ignore
//! # use tusb_osal::*;
//! Task::<FreeRtos>::new().name("usbd").stack_size(256).start(|| {
//!   loop {
//!     task::delay::<FreeRtos>(Timeout::from_millis(1000));
//!   }
//! }).unwrap();
//! ```
//!
//! Queue
//!
//! ```ignore
//! # use tusb_osal::*;
//! static EVENTS: QueueDef<u32, 16, FreeRtos> = QueueDef::new();
//!
//! let queue = EVENTS.create().unwrap();
//! queue.send(&10).unwrap();
//! assert_eq!(queue.receive(Timeout::WAIT_FOREVER), Ok(10));
//! ```
//!
//! Mutex
//!
//! ```ignore
//! # use tusb_osal::*;
//! let m = Mutex::<FreeRtos>::new().unwrap();
//! {
//!   let _guard = m.lock(Timeout::NORMAL).unwrap();
//! }
//! ```
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod error;
pub mod delay;
pub mod isr;
pub mod mutex;
pub mod port;
pub mod queue;
pub mod semaphore;
pub mod task;
pub mod timeout;

#[cfg(freertos_kernel)]
pub mod freertos;

pub use crate::delay::Delay;
pub use crate::error::{OsalError, Result};
pub use crate::isr::InterruptContext;
pub use crate::mutex::{Mutex, MutexDef, MutexGuard};
pub use crate::port::Port;
pub use crate::queue::{Queue, QueueDef};
pub use crate::semaphore::{Semaphore, SemaphoreDef};
pub use crate::task::{Task, TaskBuilder, TaskName, TaskPriority};
pub use crate::timeout::Timeout;

#[cfg(freertos_kernel)]
pub use crate::freertos::FreeRtos;
