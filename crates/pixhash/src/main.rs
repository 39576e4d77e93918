//! pixhash CLI - rename images after the MD5 of their pixels.
//!
//! Generates an MD5 hash of the decoded pixels of every image given, renames
//! each file to `<hash>.<ext>`, moves it into the output directory, and
//! optionally runs `wpg -a` on it.
//!
//! # Usage
//!
//! ```bash
//! # Move into the current directory
//! pixhash in/*.jpg
//!
//! # Move into ~/wallpapers and register each with wpg
//! pixhash -o ~/wallpapers -w in/*
//!
//! # Show the effective configuration
//! pixhash --print-config
//! ```

use clap::Parser;
use pixhash_core::Config;
use std::path::PathBuf;

mod cli;
mod logging;

/// Generate MD5 hashes from images, rename them, move them, and optionally
/// run wpg on them.
#[derive(Parser, Debug)]
#[command(name = "pixhash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "FILE", env = "PIXHASH_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    convert: cli::convert::ConvertArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("pixhash v{}", pixhash_core::VERSION);

    cli::convert::execute(cli.convert, config)
}

/// Load an explicitly named config strictly; fall back to defaults when the
/// default-location config is broken.
fn load_config(explicit: Option<&std::path::Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        return Config::load_from(std::path::Path::new(&expanded)).map_err(|e| {
            anyhow::anyhow!("Failed to load config {}: {e}", path.display())
        });
    }

    Ok(match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file at {}.",
                Config::default_path().display()
            );
            Config::default()
        }
    })
}
