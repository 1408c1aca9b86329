// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - demo: Headless walkthrough of a site visit (default when none given)
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --path: Print the config file location

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use frontdesk::config::{Config, VERSION};
use frontdesk::demo::DemoOptions;
use std::io::Write;
use std::time::Duration;

/// frontdesk - interaction controllers for a dental practice website
#[derive(Parser)]
#[command(name = "frontdesk")]
#[command(version = VERSION)]
#[command(about = "Headless booking, carousel and reveal controllers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk through a simulated visit
    Demo(DemoArgs),

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Booking attempts the simulated endpoint refuses before accepting
    #[arg(long, default_value_t = 0)]
    pub fail_first: u32,

    /// Milliseconds between scroll steps
    #[arg(long, default_value_t = 300)]
    pub scroll_ms: u64,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            fail_first: 0,
            scroll_ms: 300,
        }
    }
}

impl From<DemoArgs> for DemoOptions {
    fn from(args: DemoArgs) -> Self {
        Self {
            fail_first: args.fail_first,
            scroll_pause: Duration::from_millis(args.scroll_ms),
        }
    }
}

/// Handle config subcommands
pub fn handle_config(show: bool, reset: bool, path: bool) -> anyhow::Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        // No flag provided, show help
        println!("Usage: frontdesk config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> anyhow::Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> anyhow::Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    // Write the default config (using Config's single source of truth)
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}
