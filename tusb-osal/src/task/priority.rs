use core::fmt;

use crate::{OsalError, Port};

/// Task execution priority.
///
/// Low priority numbers denote low priority tasks. Whether the priority is valid, i.e. below the
/// kernel's number of priorities, is checked when the task is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskPriority {
  priority: u8,
}

impl TaskPriority {
  /// The priority of the idle task.
  pub const IDLE: Self = Self::new(0);

  /// Create a new `TaskPriority`.
  pub const fn new(priority: u8) -> Self {
    Self { priority }
  }

  /// Get the raw priority.
  pub const fn get(&self) -> u8 {
    self.priority
  }

  pub(crate) fn checked<P: Port>(self) -> Result<u8, OsalError> {
    if self.priority >= P::MAX_PRIORITIES {
      return Err(OsalError::InvalidPriority)
    }

    Ok(self.priority)
  }
}

impl fmt::Display for TaskPriority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.priority.fmt(f)
  }
}

impl From<u8> for TaskPriority {
  fn from(priority: u8) -> Self {
    Self::new(priority)
  }
}
