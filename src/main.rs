mod api;
mod cli;
mod config;
mod error;
mod locator;
mod models;
mod server;

use clap::Parser;
use cli::{App, Cli, Commands};
use colored::*;
use config::Config;
use dialoguer::{theme::ColorfulTheme, Select};
use error::Result;
use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up stderr logging and, when `log_dir` is given, a daily JSON log file.
///
/// The returned guard flushes the file writer on drop and must outlive `main`'s work.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "locator-forge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        },
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load();
    let _log_guard = init_logging(config.as_ref().ok().and_then(|c| c.log_dir.as_deref()));
    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Initializing locator-forge...");

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {:?}", e);
            println!(
                "{}",
                "Error: Failed to initialize application. Check logs.".red()
            );
            return Err(e);
        },
    };

    if let Some(command) = cli.command {
        return app.run_command(command).await;
    }

    println!("{}", "Welcome to the Selenium Locator Forge!".cyan().bold());

    // Main interactive loop
    loop {
        let options = &[
            "Generate a Locator",
            "Pull a Model",
            "Start a Model",
            "Stop a Model",
            "List Local Models",
            "List Running Models",
            "Serve the HTTP API",
            "Exit",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(options)
            .default(0)
            .interact_opt()? // Ctrl+C / Esc yields None
            .unwrap_or(options.len() - 1);

        println!("\n---\n");

        let command = match selection {
            0 => cli::prompt_generate(app.default_model()).map(Commands::Generate),
            1 => cli::prompt_model(app.default_model()).map(|model| Commands::Pull { model }),
            2 => cli::prompt_model(app.default_model()).map(|model| Commands::Start { model }),
            3 => cli::prompt_model(app.default_model()).map(|model| Commands::Stop { model }),
            4 => Ok(Commands::List),
            5 => Ok(Commands::Ps),
            6 => cli::prompt_bind_addr().map(|bind| Commands::Serve { bind }),
            7 => {
                println!("{}", "Exiting. Goodbye!".green());
                break;
            },
            _ => unreachable!(),
        };

        let command = match command {
            Ok(command) => command,
            Err(e) => {
                println!("{} {}", "Failed to get input:".red(), e);
                continue;
            },
        };

        if let Err(e) = app.run_command(command).await {
            error!("Command execution failed: {:?}", e);
            println!(
                "{} {}",
                "Error executing command:".red(),
                e.to_string().red()
            );
        }

        println!("\n---\n");
    }

    Ok(())
}
