use std::fs::File;
use std::io::{self, Write};

/// Kernel constants which are defined as macros with casts and
/// therefore cannot be picked up by `bindgen` directly.
const CONSTANTS: &[(&str, &str)] = &[
  ("uint16_t",    "configMINIMAL_STACK_SIZE"),
  ("uint16_t",    "configTIMER_TASK_STACK_DEPTH"),
  ("UBaseType_t", "configMAX_PRIORITIES"),
  ("UBaseType_t", "configMAX_TASK_NAME_LEN"),
  ("TickType_t",  "configTICK_RATE_HZ"),

  ("BaseType_t",  "pdFALSE"),
  ("BaseType_t",  "pdTRUE"),
  ("BaseType_t",  "pdFAIL"),
  ("BaseType_t",  "pdPASS"),
  ("BaseType_t",  "errQUEUE_FULL"),
  ("BaseType_t",  "errQUEUE_EMPTY"),

  ("TickType_t",  "portMAX_DELAY"),
];

/// Write a header which turns each constant into a typed `const` variable.
pub fn write_to_file(f: &mut File) -> io::Result<()> {
  for (ty, name) in CONSTANTS {
    let name_undef = format!("__{name}_UNDEF__");

    writeln!(f, "#ifdef {name}")?;
    writeln!(f, "static const {ty} {name_undef} = {name};")?;
    writeln!(f, "#undef {name}")?;
    writeln!(f, "const {ty} {name} = {name_undef};")?;
    writeln!(f, "#endif")?;
  }

  Ok(())
}

/// Names of all constants, for the `bindgen` allowlist.
pub fn names() -> impl Iterator<Item = &'static str> {
  CONSTANTS.iter().map(|(_, name)| *name)
}
