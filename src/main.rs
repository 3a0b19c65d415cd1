use std::error::Error;

mod app;
mod catalog;
mod cli;
mod command;
mod config;
mod display;
mod error;
mod search;
mod selection;
mod shutdown;
mod stats;
mod watched;

use app::App;
use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args = CliArgs::parse_args();
    cli_args.validate()?;

    // Logs go to stderr so they never interleave with the shell's output.
    tracing_subscriber::fmt()
        .with_max_level(cli_args.tracing_level())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting popcorn");

    let shutdown_manager = shutdown::setup_shutdown_handler();
    let config = config::AppConfig::load_with_cli_args(&cli_args)?;
    let mut app = App::new_with_config(config)?;

    tokio::select! {
        result = app.run() => {
            if let Err(e) = result {
                tracing::error!("Application error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_manager.wait_for_shutdown() => {}
    }

    if shutdown_manager.is_shutdown() {
        tracing::info!("Application shutdown requested");
    }

    // Dropping the app cancels in-flight requests and restores the title.
    drop(app);
    tracing::info!("Goodbye");
    Ok(())
}
