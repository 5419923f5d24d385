//! Access to the ambient state used for installation discovery.
//!
//! Discovery reads two sources: process environment variables and the
//! Windows registry. Both go through [`EnvProvider`] so tests can substitute
//! an in-memory fake.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::util::fs::normalize_lexically;

use super::{VcError, VsVersion};

/// Registry key listing Visual Studio install roots by version.
pub const VS7_REGISTRY_KEY: &str = r"SOFTWARE\Microsoft\VisualStudio\SxS\VS7";

/// Source of environment variables and registry values.
pub trait EnvProvider: fmt::Debug {
    /// Read a process environment variable.
    fn var(&self, name: &str) -> Option<String>;

    /// Read a string value under `HKEY_LOCAL_MACHINE\<subkey>` through the
    /// 32-bit registry view.
    fn registry_string(&self, subkey: &str, value_name: &str) -> Option<String>;
}

/// The live process environment and registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    #[cfg(windows)]
    fn registry_string(&self, subkey: &str, value_name: &str) -> Option<String> {
        use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_WOW64_32KEY};
        use winreg::RegKey;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = match hklm.open_subkey_with_flags(subkey, KEY_QUERY_VALUE | KEY_WOW64_32KEY) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("cannot open HKLM\\{}: {}", subkey, e);
                return None;
            }
        };
        key.get_value::<String, _>(value_name).ok()
    }

    #[cfg(not(windows))]
    fn registry_string(&self, _subkey: &str, _value_name: &str) -> Option<String> {
        None
    }
}

/// Locate the install root of `version`.
///
/// The `VS{N}0COMNTOOLS` variable wins over the registry; it points at
/// `<root>\Common7\Tools`, so the root is two levels up.
pub fn find_install_dir(
    version: VsVersion,
    provider: &dyn EnvProvider,
) -> Result<PathBuf, VcError> {
    let env_name = version.tools_env_var();
    if let Some(tools) = provider.var(&env_name).filter(|v| !v.is_empty()) {
        let root = normalize_lexically(&Path::new(&tools).join("..").join(".."));
        tracing::debug!("{} -> {}", env_name, root.display());
        return Ok(root);
    }

    let value_name = version.registry_value_name();
    if let Some(path) = provider
        .registry_string(VS7_REGISTRY_KEY, &value_name)
        .filter(|v| !v.is_empty())
    {
        let root = normalize_lexically(Path::new(&path));
        tracing::debug!("registry VS7\\{} -> {}", value_name, root.display());
        return Ok(root);
    }

    tracing::debug!("Visual Studio {} not found", version);
    Err(VcError::NotInstalled {
        version: Some(version.name().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEnv;

    #[test]
    fn test_env_var_takes_precedence() {
        let tools = Path::new("vs14").join("Common7").join("Tools");
        let env = FakeEnv::new()
            .with_var("VS140COMNTOOLS", tools.to_str().unwrap())
            .with_registry(VS7_REGISTRY_KEY, "14.0", "elsewhere");

        let dir = find_install_dir(VsVersion::VS2015, &env).unwrap();
        assert_eq!(dir, PathBuf::from("vs14"));
    }

    #[test]
    fn test_trailing_separator_in_tools_var() {
        let env = FakeEnv::new().with_var("VS120COMNTOOLS", "/opt/vs12/Common7/Tools/");

        let dir = find_install_dir(VsVersion::VS2013, &env).unwrap();
        assert_eq!(dir, PathBuf::from("/opt/vs12"));
    }

    #[test]
    fn test_registry_fallback() {
        let env = FakeEnv::new().with_registry(VS7_REGISTRY_KEY, "15.0", "/opt/vs15/");

        let dir = find_install_dir(VsVersion::VS2017, &env).unwrap();
        assert_eq!(dir, PathBuf::from("/opt/vs15"));
    }

    #[test]
    fn test_not_installed() {
        let env = FakeEnv::new()
            .with_var("VS120COMNTOOLS", "/opt/vs12/Common7/Tools")
            .with_registry(VS7_REGISTRY_KEY, "14.0", "/opt/vs14");

        let err = find_install_dir(VsVersion::VS2017, &env).unwrap_err();
        assert!(matches!(
            err,
            VcError::NotInstalled { version: Some(ref v) } if v == "2017"
        ));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let env = FakeEnv::new()
            .with_var("VS140COMNTOOLS", "")
            .with_registry(VS7_REGISTRY_KEY, "14.0", "");

        assert!(find_install_dir(VsVersion::VS2015, &env).is_err());
    }
}
