// frontdesk - headless runner for the practice website's interactive parts
//
// Loads configuration, sets up logging, then either handles a config
// subcommand or walks through a simulated visit:
// - Reveal controllers watch a scrolling page
// - The testimonial carousel runs on tokio timers
// - Booking and contact wizards submit to a simulated endpoint
// - Toasts are collected and printed at the end

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, DemoArgs};
use frontdesk::config::Config;
use frontdesk::demo;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config subcommands print and exit before any logging is set up
    let args = match cli.command {
        Some(Commands::Config { show, reset, path }) => {
            return cli::handle_config(show, reset, path);
        }
        Some(Commands::Demo(args)) => args,
        None => DemoArgs::default(),
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env()?;

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard = logging::init(&config.logging)?;

    tracing::info!(
        version = frontdesk::config::VERSION,
        fail_first = args.fail_first,
        "Starting demo"
    );

    // Ctrl+C cancels the walkthrough; controllers tear down as they drop
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    match demo::run_demo(&config, args.into(), shutdown_rx).await? {
        Some(report) => {
            println!();
            println!("Sections revealed: {}", report.revealed.join(", "));
            for (label, value) in &report.stats {
                println!("  {:<13} {}", label, value);
            }
            println!("Testimonial on screen: {}", report.testimonial);
            println!("Booking attempts: {}", report.booking_attempts);
            println!("Toasts:");
            for notice in &report.notices {
                println!(
                    "  [{}] {} - {}",
                    notice.level.as_str(),
                    notice.title,
                    notice.description
                );
            }
        }
        None => println!("Demo interrupted"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
