//! Event loop of a USB stack in miniature: an "interrupt" task posts transfer events into a queue,
//! the stack task drains it and signals transfer completion.
//!
//! Run with `FREERTOS_SRC` pointing at a FreeRTOS kernel checkout.

#[cfg(freertos_kernel)]
mod demo {
  use std::sync::Arc;

  use tusb_osal::*;

  static EVENTS: QueueDef<u32, 16, FreeRtos> = QueueDef::new();
  static XFER_DONE: SemaphoreDef<FreeRtos> = SemaphoreDef::new();

  pub fn main() {
    println!("Starting FreeRTOS app ...");

    let events = Arc::new(EVENTS.create().unwrap());
    let xfer_done = XFER_DONE.create().unwrap();
    let lock = Mutex::<FreeRtos>::new().unwrap();

    let dcd_events = Arc::clone(&events);
    Task::<FreeRtos>::new()
      .name("dcd_int")
      .start(move || {
        for i in 0.. {
          task::delay::<FreeRtos>(Timeout::from_millis(500));

          // Kernel tasks are plain threads on this port, pretend to be an interrupt handler.
          let mut ic = InterruptContext::<FreeRtos>::new();
          if let Err(err) = dcd_events.send_isr(&mut ic, &i) {
            println!("Dropped event {}: {}", i, err);
          }
        }
      })
      .unwrap();

    let usbd = Task::<FreeRtos>::new()
      .name("usbd")
      .priority(TaskPriority::new(2))
      .start(move || loop {
        match events.receive(Timeout::WAIT_FOREVER) {
          Ok(event) => {
            let _guard = lock.lock(Timeout::NORMAL).unwrap();
            println!("Handled event {}", event);
            let _ = xfer_done.post();
          },
          Err(err) => println!("Receive failed: {}", err),
        }
      })
      .unwrap();

    println!("Task {:?} started.", usbd);
    println!("Starting scheduler.");
    FreeRtos::start_scheduler();
  }
}

#[cfg(freertos_kernel)]
fn main() {
  demo::main()
}

#[cfg(not(freertos_kernel))]
fn main() {
  eprintln!("Built without a FreeRTOS kernel, set FREERTOS_SRC to run this example.");
}
