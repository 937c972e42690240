//! The `quizzki init` command.

use std::path::Path;

use anyhow::{Context, Result};

use quizzki_client::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    let path = Path::new("quizzki.toml");
    if path.exists() {
        println!("quizzki.toml already exists, skipping.");
        return Ok(());
    }
    std::fs::write(path, SAMPLE_CONFIG).context("failed to write quizzki.toml")?;
    println!("Created quizzki.toml");

    println!("\nNext steps:");
    println!("  1. Point base_url in quizzki.toml at your Quizzki server");
    println!("  2. Run: quizzki login --email you@school.edu --password ... [--teacher]");
    println!("  3. Run: quizzki student exam   or   quizzki teacher subjects");

    Ok(())
}
