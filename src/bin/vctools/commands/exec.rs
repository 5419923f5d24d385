//! `vctools <command> [args...]`

use anyhow::{anyhow, bail, Result};

use vctools::{CallOptions, VcTools};

use crate::cli::CHECK_CALL;

pub fn execute(tools: &VcTools, name: &str, args: &[String]) -> Result<()> {
    if name == CHECK_CALL {
        if args.is_empty() {
            bail!("check_call requires a command to run");
        }
        tools.check_call(args, &CallOptions::default())?;
        return Ok(());
    }

    let command = tools
        .command(name)
        .ok_or_else(|| anyhow!("unknown command `{}`", name))?;
    command.call(args)?;
    Ok(())
}
