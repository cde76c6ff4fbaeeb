use core::ffi::c_void;
use core::marker::PhantomData;

use alloc::boxed::Box;

use crate::{OsalError, Port, Result};

use super::{Task, TaskName, TaskPriority};

/// Capacity of the name buffer handed to the kernel, which truncates further if needed.
const NAME_CAPACITY: usize = 32;

type TaskClosure = Box<dyn FnOnce() + Send>;

/// Helper for spawning a new task, created with [`Task::new`].
pub struct TaskBuilder<'n, P: Port> {
  name: &'n str,
  stack_size: u16,
  priority: TaskPriority,
  _port: PhantomData<P>,
}

impl<P: Port> TaskBuilder<'_, P> {
  pub(crate) const fn new() -> TaskBuilder<'static, P> {
    TaskBuilder {
      name: "",
      stack_size: P::MINIMAL_STACK_SIZE,
      priority: TaskPriority::new(1),
      _port: PhantomData,
    }
  }
}

impl<P: Port> TaskBuilder<'_, P> {
  /// Set the task name.
  pub const fn name<'n>(self, name: &'n str) -> TaskBuilder<'n, P> {
    TaskBuilder {
      name,
      stack_size: self.stack_size,
      priority: self.priority,
      _port: PhantomData,
    }
  }

  /// Set the stack size in words.
  pub const fn stack_size(mut self, stack_size: u16) -> Self {
    self.stack_size = stack_size;
    self
  }

  /// Set the task priority.
  pub const fn priority(mut self, priority: TaskPriority) -> Self {
    self.priority = priority;
    self
  }

  /// Create and start the [`Task`].
  ///
  /// The task deletes itself once `f` returns.
  pub fn start<F>(&self, f: F) -> Result<Task<P>>
  where
    F: FnOnce() + Send + 'static,
  {
    extern "C" fn task_function<P: Port>(param: *mut c_void) {
      // NOTE: New scope so that everything is dropped before the task is deleted.
      {
        let function = unsafe { Box::from_raw(param.cast::<TaskClosure>()) };
        function();
      }

      P::task_delete_current();
    }

    let priority = self.priority.checked::<P>()?;
    let name = TaskName::<NAME_CAPACITY>::new(self.name);

    let function: Box<TaskClosure> = Box::new(Box::new(f));
    let param = Box::into_raw(function);

    match P::task_create(task_function::<P>, name.as_c_str(), self.stack_size, param.cast(), priority) {
      Some(handle) => {
        log::debug!("started task {:?} with priority {}", name.as_c_str(), priority);
        Ok(Task { handle, _port: PhantomData })
      },
      None => {
        // SAFETY: The kernel did not create the task, so nothing else owns the closure.
        drop(unsafe { Box::from_raw(param) });
        log::warn!("failed to create task {:?}", name.as_c_str());
        Err(OsalError::OutOfMemory)
      },
    }
  }
}
