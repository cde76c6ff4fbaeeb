//! A [`Port`] backed by `std` threads, used to drive the OSAL without a kernel.
//!
//! Every blocking call records the ticks it was given, so tests can check the
//! unit translation done by the OSAL.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ffi::{c_void, CStr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use tusb_osal::port::{Port, TaskFunction};

/// 10 ms per tick.
pub const TICK_RATE_HZ: u32 = 100;

thread_local! {
  static LAST_TICKS: Cell<Option<u32>> = const { Cell::new(None) };
  static YIELDS: RefCell<Vec<bool>> = const { RefCell::new(Vec::new()) };
  static OUT_OF_MEMORY: Cell<bool> = const { Cell::new(false) };
}

/// Run `f` with every task and kernel object creation on this thread failing.
pub fn out_of_memory<R>(f: impl FnOnce() -> R) -> R {
  OUT_OF_MEMORY.with(|oom| oom.set(true));
  let res = f();
  OUT_OF_MEMORY.with(|oom| oom.set(false));
  res
}

fn can_allocate() -> bool {
  !OUT_OF_MEMORY.with(Cell::get)
}

/// Ticks passed to the most recent blocking call on this thread.
pub fn last_ticks() -> Option<u32> {
  LAST_TICKS.with(|t| t.take())
}

/// `yield_from_isr` calls made on this thread.
pub fn yields() -> Vec<bool> {
  YIELDS.with(|y| y.take())
}

fn record_ticks(ticks: u32) {
  LAST_TICKS.with(|t| t.set(Some(ticks)));
}

fn ticks_to_duration(ticks: u32) -> Duration {
  Duration::from_millis(u64::from(ticks) * 1000 / u64::from(TICK_RATE_HZ))
}

/// Wait until `ready` succeeds on the protected state or `ticks` expire.
fn wait_until<T>(state: &Mutex<T>, cond: &Condvar, ticks: u32, mut ready: impl FnMut(&mut T) -> bool) -> bool {
  record_ticks(ticks);

  let deadline = (ticks != StdPort::MAX_DELAY).then(|| Instant::now() + ticks_to_duration(ticks));
  let mut guard = state.lock().unwrap();

  loop {
    if ready(&mut guard) {
      cond.notify_all();
      return true
    }

    guard = match deadline {
      None => cond.wait(guard).unwrap(),
      Some(deadline) => {
        let now = Instant::now();
        if now >= deadline {
          return false
        }
        cond.wait_timeout(guard, deadline - now).unwrap().0
      },
    };
  }
}

#[derive(Debug, Default)]
struct QueueState {
  items: VecDeque<Vec<u8>>,
  receivers_waiting: usize,
}

#[derive(Debug)]
pub struct MockQueue {
  length: usize,
  item_size: usize,
  state: Mutex<QueueState>,
  cond: Condvar,
}

impl MockQueue {
  /// Number of tasks blocked in `receive`.
  pub fn receivers_waiting(&self) -> usize {
    self.state.lock().unwrap().receivers_waiting
  }
}

#[derive(Debug, Default)]
struct SemaphoreState {
  given: bool,
  holder: Option<ThreadId>,
  waiting: usize,
}

#[derive(Debug)]
pub struct MockSemaphore {
  is_mutex: bool,
  state: Mutex<SemaphoreState>,
  cond: Condvar,
}

impl MockSemaphore {
  fn new(is_mutex: bool) -> &'static Self {
    let state = SemaphoreState { given: is_mutex, ..Default::default() };
    Box::leak(Box::new(Self { is_mutex, state: Mutex::new(state), cond: Condvar::new() }))
  }

  /// Number of tasks blocked in `take`.
  pub fn waiting(&self) -> usize {
    self.state.lock().unwrap().waiting
  }

  /// Whether the semaphore is currently given.
  pub fn is_given(&self) -> bool {
    self.state.lock().unwrap().given
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockTask {
  pub id: u64,
  pub priority: u8,
  pub stack_depth: u16,
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Port backed by `std` threads.
#[derive(Debug)]
pub struct StdPort;

struct Param(*mut c_void);

// The OSAL hands ownership of the parameter to the new task.
unsafe impl Send for Param {}

unsafe impl Port for StdPort {
  type TaskHandle = MockTask;
  type QueueHandle = &'static MockQueue;
  type SemaphoreHandle = &'static MockSemaphore;
  type QueueBuffer = u64;
  type SemaphoreBuffer = u64;

  const TICK_RATE_HZ: u32 = TICK_RATE_HZ;
  const MAX_DELAY: u32 = u32::MAX;
  const MAX_PRIORITIES: u8 = 5;
  const MINIMAL_STACK_SIZE: u16 = 128;

  fn task_create(
    code: TaskFunction,
    name: &CStr,
    stack_depth: u16,
    param: *mut c_void,
    priority: u8,
  ) -> Option<Self::TaskHandle> {
    if !can_allocate() {
      return None
    }

    let param = Param(param);

    thread::Builder::new()
      .name(name.to_string_lossy().into_owned())
      .spawn(move || {
        let param = param;
        code(param.0)
      })
      .ok()?;

    Some(MockTask { id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed), priority, stack_depth })
  }

  fn task_delay(ticks: u32) {
    record_ticks(ticks);
    thread::sleep(ticks_to_duration(ticks));
  }

  fn task_delete_current() {}

  fn yield_from_isr(higher_priority_task_woken: bool) {
    YIELDS.with(|y| y.borrow_mut().push(higher_priority_task_woken));
  }

  unsafe fn queue_create_static(
    length: usize,
    item_size: usize,
    _storage: *mut u8,
    _buffer: *mut Self::QueueBuffer,
  ) -> Option<Self::QueueHandle> {
    if length == 0 || !can_allocate() {
      return None
    }

    Some(Box::leak(Box::new(MockQueue {
      length,
      item_size,
      state: Mutex::new(QueueState::default()),
      cond: Condvar::new(),
    })))
  }

  unsafe fn queue_delete(_queue: Self::QueueHandle) {}

  unsafe fn queue_receive(queue: Self::QueueHandle, item: *mut c_void, ticks: u32) -> bool {
    let mut waiting = false;

    let received = wait_until(&queue.state, &queue.cond, ticks, |state| {
      match state.items.pop_front() {
        Some(bytes) => {
          std::ptr::copy_nonoverlapping(bytes.as_ptr(), item.cast::<u8>(), queue.item_size);
          if waiting {
            state.receivers_waiting -= 1;
          }
          true
        },
        None => {
          if !waiting {
            waiting = true;
            state.receivers_waiting += 1;
          }
          false
        },
      }
    });

    if !received && waiting {
      queue.state.lock().unwrap().receivers_waiting -= 1;
    }

    received
  }

  unsafe fn queue_send_to_back(queue: Self::QueueHandle, item: *const c_void, ticks: u32) -> bool {
    let bytes = std::slice::from_raw_parts(item.cast::<u8>(), queue.item_size).to_vec();

    wait_until(&queue.state, &queue.cond, ticks, |state| {
      if state.items.len() < queue.length {
        state.items.push_back(bytes.clone());
        true
      } else {
        false
      }
    })
  }

  unsafe fn queue_send_to_back_from_isr(
    queue: Self::QueueHandle,
    item: *const c_void,
    higher_priority_task_woken: &mut bool,
  ) -> bool {
    let mut state = queue.state.lock().unwrap();
    if state.items.len() >= queue.length {
      return false
    }

    state.items.push_back(std::slice::from_raw_parts(item.cast::<u8>(), queue.item_size).to_vec());
    *higher_priority_task_woken |= state.receivers_waiting > 0;
    queue.cond.notify_all();
    true
  }

  unsafe fn queue_reset(queue: Self::QueueHandle) {
    queue.state.lock().unwrap().items.clear();
    queue.cond.notify_all();
  }

  unsafe fn queue_messages_waiting(queue: Self::QueueHandle) -> usize {
    queue.state.lock().unwrap().items.len()
  }

  unsafe fn semaphore_create_binary_static(_buffer: *mut Self::SemaphoreBuffer) -> Option<Self::SemaphoreHandle> {
    can_allocate().then(|| MockSemaphore::new(false))
  }

  fn mutex_create() -> Option<Self::SemaphoreHandle> {
    can_allocate().then(|| MockSemaphore::new(true))
  }

  unsafe fn mutex_create_static(_buffer: *mut Self::SemaphoreBuffer) -> Option<Self::SemaphoreHandle> {
    can_allocate().then(|| MockSemaphore::new(true))
  }

  unsafe fn semaphore_delete(_semaphore: Self::SemaphoreHandle) {}

  unsafe fn semaphore_give(semaphore: Self::SemaphoreHandle) -> bool {
    let mut state = semaphore.state.lock().unwrap();

    if semaphore.is_mutex && state.holder != Some(thread::current().id()) {
      return false
    }

    if state.given {
      return false
    }

    state.given = true;
    state.holder = None;
    semaphore.cond.notify_all();
    true
  }

  unsafe fn semaphore_give_from_isr(semaphore: Self::SemaphoreHandle, higher_priority_task_woken: &mut bool) -> bool {
    let mut state = semaphore.state.lock().unwrap();

    if state.given {
      return false
    }

    state.given = true;
    *higher_priority_task_woken |= state.waiting > 0;
    semaphore.cond.notify_all();
    true
  }

  unsafe fn semaphore_take(semaphore: Self::SemaphoreHandle, ticks: u32) -> bool {
    let mut waiting = false;
    let me = thread::current().id();

    let taken = wait_until(&semaphore.state, &semaphore.cond, ticks, |state| {
      if state.given {
        state.given = false;
        if semaphore.is_mutex {
          state.holder = Some(me);
        }
        if waiting {
          state.waiting -= 1;
        }
        true
      } else {
        if !waiting {
          waiting = true;
          state.waiting += 1;
        }
        false
      }
    });

    if !taken && waiting {
      semaphore.state.lock().unwrap().waiting -= 1;
    }

    taken
  }

  unsafe fn semaphore_take_from_isr(semaphore: Self::SemaphoreHandle, _higher_priority_task_woken: &mut bool) -> bool {
    let mut state = semaphore.state.lock().unwrap();
    std::mem::replace(&mut state.given, false)
  }
}

/// Poll `f` until it returns `true`, panicking after a second.
pub fn wait_for(mut f: impl FnMut() -> bool) {
  let deadline = Instant::now() + Duration::from_secs(1);
  while !f() {
    assert!(Instant::now() < deadline, "condition not reached in time");
    thread::sleep(Duration::from_millis(1));
  }
}
