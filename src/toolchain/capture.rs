//! Running `vcvarsall.bat` and capturing the environment it exports.

use std::collections::HashMap;
use std::path::Path;

use encoding_rs::Encoding;

use crate::util::process::{shell_line, ProcessBuilder};

use super::VcError;

/// Printed by `vcvarsall.bat` when it does not recognise its arguments.
pub const USAGE_ERROR_MARKER: &str = "Error in script usage.";

/// Captured environment, keys uppercased.
pub type Environ = HashMap<String, String>;

/// The console code page the setup script writes with.
pub fn default_encoding() -> &'static Encoding {
    if cfg!(windows) {
        encoding_rs::IBM866
    } else {
        encoding_rs::UTF_8
    }
}

/// Run the setup script for `platform` and return the environment it leaves
/// behind.
///
/// The script exits 0 even when it rejects the platform, so a usage
/// message on stdout or anything on stderr also counts as failure.
pub fn capture_environment(
    script: &Path,
    platform: &str,
    encoding: &'static Encoding,
) -> Result<Environ, VcError> {
    let invocation = script_invocation(script, platform);

    let check = ProcessBuilder::shell(invocation.as_str()).exec()?;
    let stdout = String::from_utf8_lossy(&check.stdout);
    if !check.status.success() || stdout.contains(USAGE_ERROR_MARKER) || !check.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&check.stderr);
        return Err(VcError::Platform {
            platform: platform.to_string(),
            output: [stdout.trim_end(), stderr.trim_end()].join("\n"),
        });
    }

    let line = capture_line(script, platform);
    let pb = ProcessBuilder::shell(line);
    let output = pb.exec_and_check()?;

    let environ = parse_environment(&output.stdout, encoding);
    if environ.is_empty() {
        return Err(VcError::CommandFailed {
            command: pb.display_command(),
            code: output.status.code(),
            stderr: "no environment variables were captured".to_string(),
        });
    }
    tracing::debug!("captured {} variables from {}", environ.len(), script.display());
    Ok(environ)
}

/// Shell line that runs the setup script with its output discarded and then
/// prints the resulting environment.
///
/// On `sh` the environment is printed from an exit trap on the saved stdout,
/// so a script ending in `exit` still reports what it exported.
fn capture_line(script: &Path, platform: &str) -> String {
    if cfg!(windows) {
        format!("{} > nul && set", script_invocation(script, platform))
    } else {
        let script = script.to_string_lossy();
        format!(
            "set -- {}; exec 3>&1 > /dev/null; trap 'env >&3' EXIT; . {}",
            shell_line(&[platform]),
            shell_line(&[script.as_ref()])
        )
    }
}

/// Shell line that runs `script` with `platform` in the current shell
/// session, so the variables it sets are visible to later commands.
fn script_invocation(script: &Path, platform: &str) -> String {
    let script = script.to_string_lossy();
    if cfg!(windows) {
        shell_line(&[script.as_ref(), platform])
    } else {
        format!(
            "set -- {} && . {}",
            shell_line(&[platform]),
            shell_line(&[script.as_ref()])
        )
    }
}

/// Parse `KEY=VALUE` lines, uppercasing keys.
///
/// Lines that do not decode cleanly under `encoding` are dropped, as are
/// lines without `=`.
pub fn parse_environment(raw: &[u8], encoding: &'static Encoding) -> Environ {
    let mut environ = Environ::new();
    for bytes in raw.split(|&b| b == b'\n') {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        let Some(line) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
        else {
            tracing::trace!("skipping line not representable in {}", encoding.name());
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                environ.insert(key.to_uppercase(), value.to_string());
            }
            None => tracing::trace!("skipping line without `=`: {}", line),
        }
    }
    environ
}
