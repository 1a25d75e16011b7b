//! `hash` command implementation.

use anyhow::{Context, Result};

use crate::cli::HashArgs;

/// Execute the `hash` command
pub fn run_hash(args: &HashArgs) -> Result<()> {
    let hashed = identity::hash_email(&args.email).context("Cannot hash email")?;
    println!("{}", hashed);
    Ok(())
}
