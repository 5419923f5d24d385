//! Test utilities and fakes for vctools unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use vctools::test_support::{fake_install, FakeEnv};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let env = fake_install(FakeEnv::new(), tmp.path(), VsVersion::VS2015, "export FOO=bar\n");
//!     let tools = Locator::new().provider(&env).locate().unwrap();
//! }
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::toolchain::{EnvProvider, VsVersion};

/// In-memory environment variables and registry values.
#[derive(Debug, Default)]
pub struct FakeEnv {
    vars: HashMap<String, String>,
    registry: HashMap<(String, String), String>,
    lookups: Cell<usize>,
}

impl FakeEnv {
    pub fn new() -> Self {
        FakeEnv::default()
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_registry(mut self, subkey: &str, value_name: &str, value: &str) -> Self {
        self.registry.insert(
            (subkey.to_string(), value_name.to_string()),
            value.to_string(),
        );
        self
    }

    /// Number of reads made through the provider so far.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl EnvProvider for FakeEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.lookups.set(self.lookups.get() + 1);
        self.vars.get(name).cloned()
    }

    fn registry_string(&self, subkey: &str, value_name: &str) -> Option<String> {
        self.lookups.set(self.lookups.get() + 1);
        self.registry
            .get(&(subkey.to_string(), value_name.to_string()))
            .cloned()
    }
}

/// Write an executable `/bin/sh` script, creating `dir` if needed.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Lay out a fake installation of `version` below `base` whose setup script
/// runs `script_body`, and point `VS{N}0COMNTOOLS` at it.
#[cfg(unix)]
pub fn fake_install(env: FakeEnv, base: &Path, version: VsVersion, script_body: &str) -> FakeEnv {
    let root = base.join(format!("vs{}", version.ordinal()));
    let script = version.setup_script(&root);
    let script_dir = script.parent().unwrap();
    let script_name = script.file_name().unwrap().to_str().unwrap();
    write_script(script_dir, script_name, script_body);

    let tools = root.join("Common7").join("Tools");
    fs::create_dir_all(&tools).unwrap();
    env.with_var(&version.tools_env_var(), tools.to_str().unwrap())
}
