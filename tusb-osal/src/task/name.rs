use core::ffi::CStr;

/// Helper struct for passing a `&str` as a nul-terminated task name.
///
/// Names longer than `CAPACITY - 1` bytes are truncated at a character boundary.
pub struct TaskName<const CAPACITY: usize> {
  buf: [u8; CAPACITY],
}

impl<const CAPACITY: usize> TaskName<CAPACITY> {
  /// Copy `name`, truncating it to fit.
  pub fn new(name: &str) -> Self {
    let mut buf = [0; CAPACITY];

    let mut len = 0;
    for c in name.chars() {
      // Interior nul bytes would silently cut the name short.
      if c == '\0' || len + c.len_utf8() >= CAPACITY {
        break
      }

      c.encode_utf8(&mut buf[len..]);
      len += c.len_utf8();
    }

    Self { buf }
  }

  /// Get the name as a C string.
  pub fn as_c_str(&self) -> &CStr {
    // The buffer always contains a nul byte after the copied name.
    CStr::from_bytes_until_nul(&self.buf).unwrap_or_default()
  }
}
