use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

#[derive(Debug)]
pub enum Error {
  HeapConflict(u8, u8),
  UnsupportedTarget(String),
  Walk(walkdir::Error),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::HeapConflict(a, b) => write!(f, "features `heap_{a}` and `heap_{b}` are mutually exclusive"),
      Self::UnsupportedTarget(target) => write!(f, "target '{target}' is not supported"),
      Self::Walk(err) => write!(f, "failed finding kernel sources: {err}"),
    }
  }
}

impl From<walkdir::Error> for Error {
  fn from(err: walkdir::Error) -> Self {
    Self::Walk(err)
  }
}

/// Memory manager selected by the `heap_N` features, `heap_4` if none is.
fn heap_file() -> Result<String, Error> {
  let enabled = (1..=5u8).filter(|i| env::var_os(format!("CARGO_FEATURE_HEAP_{i}")).is_some());

  let mut heap = None;
  for i in enabled {
    if let Some(h) = heap {
      return Err(Error::HeapConflict(h, i))
    }
    heap = Some(i);
  }

  Ok(format!("heap_{}.c", heap.unwrap_or(4)))
}

/// Port directory, relative to `portable/`, for the compilation target.
fn port_dir() -> Result<PathBuf, Error> {
  let target = env::var("TARGET").unwrap_or_default();
  let family = env::var("CARGO_CFG_TARGET_FAMILY").unwrap_or_default();

  let dir: PathBuf = match target.as_str() {
    "thumbv6m-none-eabi" => ["GCC", "ARM_CM0"].iter().collect(),
    "thumbv7m-none-eabi" | "thumbv7em-none-eabi" => ["GCC", "ARM_CM3"].iter().collect(),
    "thumbv7em-none-eabihf" => ["GCC", "ARM_CM4F"].iter().collect(),
    "thumbv8m.main-none-eabi" | "thumbv8m.main-none-eabihf" => {
      ["GCC", "ARM_CM33_NTZ", "non_secure"].iter().collect()
    },
    _ if family == "unix" => ["ThirdParty", "GCC", "Posix"].iter().collect(),
    _ if family == "windows" => PathBuf::from("MSVC-MingW"),
    _ => return Err(Error::UnsupportedTarget(target)),
  };

  Ok(dir)
}

/// All `.c` files below `dir`, at most `depth` levels deep.
fn c_files(dir: &Path, depth: Option<usize>) -> Result<Vec<PathBuf>, Error> {
  let walk = WalkDir::new(dir).follow_links(false);
  let walk = match depth {
    Some(depth) => walk.max_depth(depth),
    None => walk,
  };

  let mut files = Vec::new();
  for entry in walk {
    let path = entry?.into_path();
    if path.extension().is_some_and(|ext| ext == "c") {
      files.push(path);
    }
  }

  Ok(files)
}

/// Location of the kernel sources and of everything compiled along with them.
pub struct Kernel {
  pub sources: Vec<PathBuf>,
  pub includes: Vec<PathBuf>,
}

impl Kernel {
  pub fn locate(source: &Path, config: &Path, shim: &Path) -> Result<Self, Error> {
    let portable = source.join("portable");
    let port = portable.join(port_dir()?);

    let mut sources = c_files(source, Some(1))?;
    sources.extend(c_files(&port, None)?);
    sources.push(portable.join("MemMang").join(heap_file()?));
    sources.push(shim.join("shim.c"));

    let includes = vec![source.join("include"), port, config.to_owned(), shim.to_owned()];

    Ok(Self { sources, includes })
  }

  /// C compiler for the kernel and the shim.
  pub fn cc(&self) -> cc::Build {
    let mut cc = cc::Build::new();

    for file in &self.sources {
      debug!("Compiling {}", file.display());
      cc.file(file);
    }
    cc.includes(&self.includes);

    cc
  }

  /// `bindgen` builder seeing the same headers as the C compiler.
  pub fn bindgen(&self) -> bindgen::Builder {
    self.includes.iter().fold(
      bindgen::builder()
        .use_core()
        .ctypes_prefix("::core::ffi")
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new())),
      |builder, include| builder.clang_arg(format!("-I{}", include.display())),
    )
  }
}
