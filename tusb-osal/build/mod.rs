use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;

use bindgen::callbacks::{IntKind, ParseCallbacks};
use log::{info, warn, error};

mod build;
mod constants;

/// Shim functions and the kernel functions the OSAL forwards to.
const FUNCTIONS: &str = "tusb_osal_.*";

/// Types needed for statically allocated kernel objects.
const TYPES: &str = "StaticQueue_t|StaticSemaphore_t|StaticTask_t|StackType_t|TaskFunction_t";

#[derive(Debug)]
struct Callbacks;

impl ParseCallbacks for Callbacks {
  fn int_macro(&self, name: &str, value: i64) -> Option<IntKind> {
    match name {
      "configUSE_TIMERS" if value != 0 => {
        println!(r#"cargo:rustc-cfg=freertos_feature="timers""#);
      },
      "configSUPPORT_DYNAMIC_ALLOCATION" if value != 0 => {
        println!(r#"cargo:rustc-cfg=freertos_feature="dynamic_allocation""#);
      },
      _ => (),
    }

    None
  }
}

// See: https://doc.rust-lang.org/cargo/reference/build-scripts.html
fn main() {
  stderrlog::new().module(module_path!()).verbosity(2).init().ok();

  println!("cargo:rerun-if-changed=build");
  println!("cargo:rerun-if-changed=src/freertos");
  println!("cargo:rerun-if-env-changed=FREERTOS_SRC");
  println!("cargo:rerun-if-env-changed=FREERTOS_CONFIG");
  println!("cargo:rustc-check-cfg=cfg(freertos_kernel)");
  println!(r#"cargo:rustc-check-cfg=cfg(freertos_feature, values("timers", "dynamic_allocation"))"#);

  let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
  let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
  let shim_dir = manifest_dir.join("src/freertos");
  println!("cargo:SHIM={}", shim_dir.display());

  let freertos_source = if let Some(freertos_source) = env::var_os("FREERTOS_SRC") {
    PathBuf::from(freertos_source)
  } else {
    println!("cargo:warning=FREERTOS_SRC is not set, the FreeRTOS port is disabled");
    return
  };

  let freertos_config = if let Some(freertos_config) = env::var_os("FREERTOS_CONFIG") {
    PathBuf::from(freertos_config)
  } else {
    warn!("FREERTOS_CONFIG is not set, using the default configuration");
    shim_dir.join("config")
  };
  info!("Building FreeRTOS from {} with config {}", freertos_source.display(), freertos_config.display());

  let constants = out_dir.join("constants.h");
  if let Err(err) = File::create(&constants).and_then(|mut f| constants::write_to_file(&mut f)) {
    error!("Failed writing {}: {}", constants.display(), err);
    exit(1);
  }

  let kernel = build::Kernel::locate(&freertos_source, &freertos_config, &shim_dir)
    .unwrap_or_else(|err| {
      error!("{}", err);
      exit(1);
    });

  if let Err(err) = kernel.cc().try_compile("freertos") {
    error!("Compilation failed: {}", err);
    exit(1);
  }

  let mut bindgen = kernel.bindgen()
    .header(shim_dir.join("shim.h").display().to_string())
    .header(constants.display().to_string())
    .generate_comments(false)
    .allowlist_function(FUNCTIONS)
    .allowlist_type(TYPES)
    .parse_callbacks(Box::new(Callbacks));

  for name in constants::names() {
    bindgen = bindgen.allowlist_var(name);
  }

  let bindings = out_dir.join("shim.rs");

  bindgen
    .generate().unwrap_or_else(|err| {
      error!("Failed generating bindings: {}", err);
      exit(1);
    })
    .write_to_file(&bindings).unwrap_or_else(|err| {
      error!("Failed writing bindings: {}", err);
      exit(1);
    });

  println!("cargo:rustc-cfg=freertos_kernel");
}
