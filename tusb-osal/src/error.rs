use core::fmt;

/// A result with the [`OsalError`] error.
pub type Result<T> = core::result::Result<T, OsalError>;

/// Error returned by OSAL operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OsalError {
  /// A blocking operation did not complete before its timeout expired.
  Timeout,
  /// No more space in the queue.
  QueueFull,
  /// The binary semaphore was already posted.
  AlreadyPosted,
  /// The mutex is not held by the calling task.
  NotOwner,
  /// The kernel could not allocate the object.
  OutOfMemory,
  /// The static definition already backs a live object.
  AlreadyCreated,
  /// The task priority is not below the kernel's maximum priority.
  InvalidPriority,
}

impl core::error::Error for OsalError {}

impl fmt::Display for OsalError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Timeout => write!(f, "timed out"),
      Self::QueueFull => write!(f, "queue is full"),
      Self::AlreadyPosted => write!(f, "semaphore already posted"),
      Self::NotOwner => write!(f, "mutex not held by the calling task"),
      Self::OutOfMemory => write!(f, "out of memory"),
      Self::AlreadyCreated => write!(f, "definition already in use"),
      Self::InvalidPriority => write!(f, "invalid task priority"),
    }
  }
}
