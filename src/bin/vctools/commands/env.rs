//! `vctools --print-env`

use std::io::{self, Write};

use anyhow::Result;

use vctools::VcTools;

pub fn execute(tools: &VcTools) -> Result<()> {
    let mut vars: Vec<(&String, &String)> = tools.environ().iter().collect();
    vars.sort();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (key, value) in vars {
        writeln!(out, "{}={}", key, value)?;
    }
    Ok(())
}
