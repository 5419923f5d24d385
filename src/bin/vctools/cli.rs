//! CLI definitions using clap.

use clap::builder::PossibleValuesParser;
use clap::Parser;

/// Runs its arguments as a whole command line.
pub const CHECK_CALL: &str = "check_call";

/// Names accepted as the `command` argument.
pub const COMMAND_NAMES: [&str; 8] = [
    CHECK_CALL,
    "devenv",
    "msbuild",
    "nmake",
    "cl",
    "ml",
    "lib",
    "link",
];

/// Visual Studio C++ tools runner
#[derive(Parser)]
#[command(name = "vctools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Visual Studio version (2012, 2013, 2015, 2017); newest installed if omitted
    #[arg(short = 'v', long, env = "VCTOOLS_VERSION")]
    pub version_name: Option<String>,

    /// Target platform passed to vcvarsall.bat (x86, amd64, x86_amd64, ...)
    #[arg(short = 't', long, env = "VCTOOLS_TARGET_PLATFORM")]
    pub target_platform: Option<String>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Print the captured environment instead of running a command
    #[arg(long)]
    pub print_env: bool,

    /// Tool to run; `check_call` runs the arguments as a command
    #[arg(
        value_parser = PossibleValuesParser::new(COMMAND_NAMES),
        required_unless_present = "print_env"
    )]
    pub command: Option<String>,

    /// Arguments forwarded to the tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
