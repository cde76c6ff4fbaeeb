//! Runs the OSAL on the FreeRTOS POSIX port.
//!
//! Only one test per binary, the scheduler cannot be restarted.
#![cfg(freertos_kernel)]

use std::sync::atomic::{AtomicBool, Ordering};

use tusb_osal::{FreeRtos, InterruptContext, Mutex, OsalError, QueueDef, SemaphoreDef, Task, TaskPriority, Timeout};

static EVENTS: QueueDef<u32, 4, FreeRtos> = QueueDef::new();
static XFER_DONE: SemaphoreDef<FreeRtos> = SemaphoreDef::new();
static PASSED: AtomicBool = AtomicBool::new(false);

fn run_freertos_test(to_test_fn: impl FnOnce() + Send + 'static) {
  Task::<FreeRtos>::new()
    .name("test")
    .priority(TaskPriority::new(2))
    .start(move || {
      to_test_fn();

      // SAFETY: Tests run on the POSIX port, which supports ending the scheduler.
      unsafe { FreeRtos::end_scheduler() }
    })
    .unwrap();

  FreeRtos::start_scheduler();
}

#[test]
fn osal_on_freertos() {
  run_freertos_test(|| {
    let events = EVENTS.create().unwrap();
    let xfer_done = XFER_DONE.create().unwrap();
    let mutex = Mutex::<FreeRtos>::new().unwrap();

    assert_eq!(events.receive(Timeout::from_millis(20)), Err(OsalError::Timeout));
    assert_eq!(xfer_done.wait(Timeout::NO_WAIT), Err(OsalError::Timeout));

    assert_eq!(EVENTS.create().err(), Some(OsalError::AlreadyCreated));

    events.send(&1).unwrap();
    {
      let mut ic = InterruptContext::<FreeRtos>::new();
      events.send_isr(&mut ic, &2).unwrap();
    }
    assert_eq!(events.len(), 2);
    assert_eq!(events.receive(Timeout::WAIT_FOREVER), Ok(1));
    assert_eq!(events.receive(Timeout::NORMAL), Ok(2));

    xfer_done.post().unwrap();
    assert_eq!(xfer_done.post(), Err(OsalError::AlreadyPosted));
    xfer_done.wait(Timeout::NORMAL).unwrap();

    mutex.wait(Timeout::NORMAL).unwrap();
    mutex.release().unwrap();
    assert_eq!(mutex.release(), Err(OsalError::NotOwner));

    tusb_osal::task::delay::<FreeRtos>(Timeout::from_millis(10));

    PASSED.store(true, Ordering::Relaxed);
  });

  assert!(PASSED.load(Ordering::Relaxed));
}
