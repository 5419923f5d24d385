//! Visual C++ toolchain discovery and execution.
//!
//! [`VcTools`] finds an installed Visual Studio, runs its `vcvarsall.bat`
//! for a target platform and keeps the resulting environment. Toolchain
//! executables are then run with that environment applied.
//!
//! Discovery order for each version:
//! 1. `VS{N}0COMNTOOLS` environment variable
//! 2. `HKLM\SOFTWARE\Microsoft\VisualStudio\SxS\VS7` registry key
//!
//! Without an explicit version, every known version is tried from newest to
//! oldest and the first one that works for the platform is used.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use encoding_rs::Encoding;

use crate::util::process::{shell_line, ProcessBuilder};

mod capture;
mod error;
mod provider;
mod tools;
mod version;

pub use capture::{capture_environment, default_encoding, parse_environment, Environ, USAGE_ERROR_MARKER};
pub use error::VcError;
pub use provider::{find_install_dir, EnvProvider, SystemEnv, VS7_REGISTRY_KEY};
pub use tools::{CallOptions, Tool, ToolCommand};
pub use version::VsVersion;

/// Platform passed to `vcvarsall.bat` when none is given.
pub const DEFAULT_PLATFORM: &str = "x86";

/// Reported by [`VcTools::get_target_platform`] when the setup script does
/// not set `PLATFORM`.
pub const DEFAULT_TARGET_PLATFORM: &str = "X86";

static SYSTEM_ENV: SystemEnv = SystemEnv;

/// An installed toolchain and the environment captured for it.
#[derive(Debug, Clone)]
pub struct Installation {
    pub version: VsVersion,
    /// Root found during discovery
    pub install_dir: PathBuf,
    /// Platform token given to the setup script
    pub platform: String,
    pub environ: Environ,
}

impl Installation {
    /// Locate `version` and capture its environment for `platform`.
    pub fn load(
        version: VsVersion,
        platform: &str,
        provider: &dyn EnvProvider,
        encoding: &'static Encoding,
    ) -> Result<Self, VcError> {
        let install_dir = find_install_dir(version, provider)?;
        let script = version.setup_script(&install_dir);
        let environ = capture_environment(&script, platform, encoding)?;
        Ok(Installation {
            version,
            install_dir,
            platform: platform.to_string(),
            environ,
        })
    }
}

/// Settings for locating a toolchain.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    version_name: Option<&'a str>,
    platform: &'a str,
    provider: &'a dyn EnvProvider,
    encoding: &'static Encoding,
}

impl<'a> Locator<'a> {
    /// Auto-detect the version for the default platform using the live
    /// environment and registry.
    pub fn new() -> Self {
        Locator {
            version_name: None,
            platform: DEFAULT_PLATFORM,
            provider: &SYSTEM_ENV,
            encoding: default_encoding(),
        }
    }

    /// Request a version by year label; `None` auto-detects.
    pub fn version(mut self, name: Option<&'a str>) -> Self {
        self.version_name = name;
        self
    }

    pub fn platform(mut self, platform: &'a str) -> Self {
        self.platform = platform;
        self
    }

    pub fn provider(mut self, provider: &'a dyn EnvProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Encoding of the setup script's output.
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn locate(&self) -> Result<VcTools, VcError> {
        let installation = match self.version_name {
            Some(name) => {
                let version: VsVersion = name.parse()?;
                Installation::load(version, self.platform, self.provider, self.encoding)?
            }
            None => self.detect_newest()?,
        };

        tracing::info!(
            "using Visual Studio {} at {} ({})",
            installation.version,
            installation.install_dir.display(),
            installation.platform
        );
        Ok(VcTools::from_installation(installation))
    }

    fn detect_newest(&self) -> Result<Installation, VcError> {
        for version in VsVersion::newest_first() {
            match Installation::load(version, self.platform, self.provider, self.encoding) {
                Ok(installation) => return Ok(installation),
                Err(e) if e.is_skippable() => {
                    tracing::debug!("skipping Visual Studio {}: {}", version, e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(VcError::NotInstalled { version: None })
    }
}

impl Default for Locator<'_> {
    fn default() -> Self {
        Locator::new()
    }
}

/// A located Visual C++ toolchain.
#[derive(Debug, Clone)]
pub struct VcTools {
    installation: Installation,
    commands: BTreeMap<&'static str, Tool>,
}

impl VcTools {
    /// Locate a toolchain using the live environment and registry.
    ///
    /// `version_name` is a year label such as `"2015"`; `None` picks the
    /// newest installed version that supports `platform`.
    pub fn new(version_name: Option<&str>, platform: &str) -> Result<Self, VcError> {
        Locator::new().version(version_name).platform(platform).locate()
    }

    /// Wrap an already captured installation.
    pub fn from_installation(installation: Installation) -> Self {
        let commands = Tool::ALL.iter().map(|&t| (t.as_str(), t)).collect();
        VcTools {
            installation,
            commands,
        }
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    pub fn version(&self) -> VsVersion {
        self.installation.version
    }

    /// The captured environment, keys uppercased.
    pub fn environ(&self) -> &Environ {
        &self.installation.environ
    }

    /// Look up a captured variable, ignoring case.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.installation
            .environ
            .get(&name.to_uppercase())
            .map(String::as_str)
    }

    /// The Visual C++ install directory (`VCINSTALLDIR`).
    pub fn get_vc_install_dir(&self) -> Result<&str, VcError> {
        self.var("VCINSTALLDIR").ok_or_else(|| VcError::MissingVariable {
            name: "VCINSTALLDIR".to_string(),
        })
    }

    /// The Visual Studio install directory.
    ///
    /// Newer setup scripts do not export `VSINSTALLDIR`; the root found
    /// during discovery is used then.
    pub fn get_vs_install_dir(&self) -> PathBuf {
        match self.var("VSINSTALLDIR").filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => self.installation.install_dir.clone(),
        }
    }

    /// The target platform recorded by the setup script, uppercased.
    pub fn get_target_platform(&self) -> String {
        self.var("PLATFORM")
            .unwrap_or(DEFAULT_TARGET_PLATFORM)
            .to_uppercase()
    }

    /// Tool registered under `name`, if any.
    pub fn command(&self, name: &str) -> Option<ToolCommand<'_>> {
        self.commands.get(name).map(|&t| ToolCommand::new(self, t))
    }

    pub fn tool(&self, tool: Tool) -> ToolCommand<'_> {
        ToolCommand::new(self, tool)
    }

    /// Names accepted by [`VcTools::command`].
    pub fn command_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Run `args` through the shell and fail on a non-zero exit.
    ///
    /// The child sees the captured environment unless `options.env` is set.
    pub fn check_call<S: AsRef<str>>(&self, args: &[S], options: &CallOptions) -> Result<(), VcError> {
        if args.is_empty() {
            return Err(VcError::Spawn {
                command: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
            });
        }
        self.process(args, options).status_and_check()
    }

    pub(crate) fn process<S: AsRef<str>>(&self, args: &[S], options: &CallOptions) -> ProcessBuilder {
        let env = options.env.as_ref().unwrap_or(&self.installation.environ);
        let mut pb = ProcessBuilder::shell(shell_line(args)).env_exact(env);
        if let Some(cwd) = options.cwd.as_deref() {
            pb = pb.cwd(cwd);
        }
        pb
    }

    pub fn devenv<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Devenv).call(args)
    }

    pub fn msbuild<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Msbuild).call(args)
    }

    pub fn nmake<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Nmake).call(args)
    }

    /// Run the compiler, e.g. `tools.cl(&["/c", "a.cpp"])`.
    pub fn cl<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Cl).call(args)
    }

    pub fn ml<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Ml).call(args)
    }

    pub fn lib<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Lib).call(args)
    }

    pub fn link<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.tool(Tool::Link).call(args)
    }
}
