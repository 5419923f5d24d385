//! Named toolchain executables.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{VcError, VcTools};

/// An executable shipped with the toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    /// IDE driver
    Devenv,
    /// Project build driver
    Msbuild,
    /// Makefile driver
    Nmake,
    /// C/C++ compiler
    Cl,
    /// Assembler
    Ml,
    /// Librarian
    Lib,
    /// Linker
    Link,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Devenv,
        Tool::Msbuild,
        Tool::Nmake,
        Tool::Cl,
        Tool::Ml,
        Tool::Lib,
        Tool::Link,
    ];

    /// Executable name as typed on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Devenv => "devenv",
            Tool::Msbuild => "msbuild",
            Tool::Nmake => "nmake",
            Tool::Cl => "cl",
            Tool::Ml => "ml",
            Tool::Lib => "lib",
            Tool::Link => "link",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown tool '{}'", s))
    }
}

/// Options for [`VcTools::check_call`].
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Run with exactly this environment instead of the captured one.
    pub env: Option<HashMap<String, String>>,
    /// Working directory for the child.
    pub cwd: Option<PathBuf>,
}

impl CallOptions {
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// A tool bound to a located toolchain.
#[derive(Debug, Clone, Copy)]
pub struct ToolCommand<'a> {
    tools: &'a VcTools,
    tool: Tool,
}

impl<'a> ToolCommand<'a> {
    pub(crate) fn new(tools: &'a VcTools, tool: Tool) -> Self {
        ToolCommand { tools, tool }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The tool name followed by `args`.
    pub fn argv<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        std::iter::once(self.tool.as_str().to_string())
            .chain(args.iter().map(|a| a.as_ref().to_string()))
            .collect()
    }

    /// Run the tool in the captured environment.
    pub fn call<S: AsRef<str>>(&self, args: &[S]) -> Result<(), VcError> {
        self.call_with(args, &CallOptions::default())
    }

    pub fn call_with<S: AsRef<str>>(&self, args: &[S], options: &CallOptions) -> Result<(), VcError> {
        self.tools.check_call(&self.argv(args), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
        }
        assert!("gcc".parse::<Tool>().is_err());
        assert!("CL".parse::<Tool>().is_err());
    }

    #[test]
    fn test_call_options_builder() {
        let opts = CallOptions::default().cwd("build");
        assert_eq!(opts.cwd, Some(PathBuf::from("build")));
        assert!(opts.env.is_none());
    }
}
