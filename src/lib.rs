//! vctools - Run Visual C++ tools in the environment of an installed toolchain
//!
//! This crate locates an installed Visual Studio, captures the environment
//! its `vcvarsall.bat` exports for a target platform, and runs the
//! toolchain's executables (`cl`, `link`, `lib`, `ml`, `nmake`, `msbuild`,
//! `devenv`) with that environment applied.

pub mod toolchain;
pub mod util;

/// Test utilities and fakes for vctools unit tests.
#[cfg(test)]
pub mod test_support;

pub use toolchain::{CallOptions, Locator, Tool, VcError, VcTools, VsVersion};
