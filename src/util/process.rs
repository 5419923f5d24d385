//! Subprocess execution utilities.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::toolchain::VcError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    /// Arguments passed through without quoting (Windows only).
    raw_args: Vec<String>,
    env: HashMap<String, String>,
    env_clear: bool,
    cwd: Option<PathBuf>,
    display: Option<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            raw_args: Vec::new(),
            env: HashMap::new(),
            env_clear: false,
            cwd: None,
            display: None,
        }
    }

    /// Run `line` through the platform shell.
    ///
    /// Windows gets `cmd /D /S /C "<line>"` with the line passed verbatim;
    /// elsewhere `sh -c <line>`.
    pub fn shell(line: impl Into<String>) -> Self {
        let line = line.into();
        let builder = if cfg!(windows) {
            let mut pb = ProcessBuilder::new("cmd").args(["/D", "/S", "/C"]);
            pb.raw_args.push(format!("\"{}\"", line));
            pb
        } else {
            ProcessBuilder::new("sh").args(["-c", line.as_str()])
        };
        ProcessBuilder {
            display: Some(line),
            ..builder
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Replace the inherited environment with exactly `vars`.
    pub fn env_exact<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        self.env_clear = true;
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the environment that will be set on the child.
    pub fn get_env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Whether the inherited environment is cleared before spawning.
    pub fn is_env_exact(&self) -> bool {
        self.env_clear
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            for raw in &self.raw_args {
                cmd.raw_arg(raw);
            }
        }
        #[cfg(not(windows))]
        cmd.args(&self.raw_args);

        if self.env_clear {
            cmd.env_clear();
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command with captured output and wait for completion.
    pub fn exec(&self) -> Result<Output, VcError> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("running `{}`", self.display_command());
        cmd.output().map_err(|source| VcError::Spawn {
            command: self.display_command(),
            source,
        })
    }

    /// Execute with captured output and require success.
    pub fn exec_and_check(&self) -> Result<Output, VcError> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(VcError::CommandFailed {
                command: self.display_command(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }

    /// Execute with inherited stdio and return the status only.
    pub fn status(&self) -> Result<ExitStatus, VcError> {
        let mut cmd = self.build_command();
        tracing::debug!("running `{}`", self.display_command());
        cmd.status().map_err(|source| VcError::Spawn {
            command: self.display_command(),
            source,
        })
    }

    /// Execute with inherited stdio and require success.
    pub fn status_and_check(&self) -> Result<(), VcError> {
        let status = self.status()?;
        if !status.success() {
            return Err(VcError::CommandFailed {
                command: self.display_command(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        if let Some(ref line) = self.display {
            return line.clone();
        }
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Join a command list into one line for the platform shell.
pub fn shell_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| {
            if cfg!(windows) {
                quote_cmd_arg(a.as_ref())
            } else {
                quote_sh_arg(a.as_ref())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote an argument using the MSVC C runtime parsing rules.
pub fn quote_cmd_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t']);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }

    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }

    if needs_quotes {
        // Backslashes before the closing quote must be doubled.
        out.extend(std::iter::repeat('\\').take(backslashes * 2));
        out.push('"');
    } else {
        out.extend(std::iter::repeat('\\').take(backslashes));
    }
    out
}

/// Quote an argument for a POSIX shell.
pub fn quote_sh_arg(arg: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "_./:=+,@%-".contains(c);
    if !arg.is_empty() && arg.chars().all(is_safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
