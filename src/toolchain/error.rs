//! Error types for toolchain discovery and tool execution.

use std::io;

use thiserror::Error;

/// Error raised while locating a toolchain or running one of its tools.
#[derive(Debug, Error)]
pub enum VcError {
    /// The requested version label is not in the known version table.
    #[error("Visual Studio {name} is not supported")]
    Version { name: String },

    /// No installation could be found for the version (or for any version,
    /// when `version` is `None`).
    #[error("{}", not_installed_message(.version.as_deref()))]
    NotInstalled { version: Option<String> },

    /// The setup script rejected the target platform.
    #[error("target platform `{platform}` is not supported by this toolchain\n{output}")]
    Platform { platform: String, output: String },

    /// A child process could not be started.
    #[error("failed to execute `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A child process exited with a non-zero status.
    #[error("`{command}` failed with exit code {}{}", display_code(.code), display_stderr(.stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A variable the setup script should export is absent.
    #[error("`{name}` is not set in the captured environment")]
    MissingVariable { name: String },
}

impl VcError {
    /// Whether auto-detection should move on to the next older version.
    pub fn is_skippable(&self) -> bool {
        matches!(self, VcError::NotInstalled { .. } | VcError::Platform { .. })
    }
}

fn not_installed_message(version: Option<&str>) -> String {
    match version {
        Some(v) => format!("can't find Visual Studio {}", v),
        None => "Visual Studio is not installed for target platform".to_string(),
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "<signal>".to_string(),
    }
}

fn display_stderr(stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}
