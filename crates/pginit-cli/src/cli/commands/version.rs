//! `pginit version` – print version of program.

use anyhow::Result;

pub fn run_version() -> Result<()> {
    println!("pginit {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
