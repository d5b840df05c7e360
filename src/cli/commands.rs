use super::output::{models_table, running_table};
use crate::api::OllamaClient;
use crate::config::{parse_bind_addr, Config};
use crate::error::{AppError, Result};
use crate::locator::{parse_locator, LocatorGenerator};
use crate::server::{self, AppState};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Generate Selenium locators with a local Ollama model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the locator HTTP API
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:5001 (default: LOCATOR_BIND_ADDR)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate a locator for one element and print it
    Generate(GenerateArgs),

    /// Download a model into the Ollama runtime
    Pull {
        /// Model name, e.g. llama3.2:latest or qwen3:0.6b
        model: String,
    },

    /// Load a model into memory so it can serve requests
    Start {
        /// Model name
        model: String,
    },

    /// Unload a model from memory
    Stop {
        /// Model name
        model: String,
    },

    /// List models available locally
    List,

    /// List models currently loaded in memory
    Ps,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Inline HTML markup
    #[arg(long, conflicts_with = "html_file", required_unless_present = "html_file")]
    pub html: Option<String>,

    /// File containing the HTML markup
    #[arg(long, value_name = "PATH")]
    pub html_file: Option<PathBuf>,

    /// Description of the target element
    #[arg(short, long)]
    pub prompt: String,

    /// Model to ask (default: LOCATOR_DEFAULT_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Checks that `name` is usable as an Ollama model reference.
pub fn validate_model_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Cli("Model name must not be empty".to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(AppError::Cli(format!(
            "Invalid model name '{}': must not contain whitespace",
            name
        )));
    }
    Ok(name)
}

/// CLI application
pub struct App {
    config: Config,
    generator: LocatorGenerator,
}

impl App {
    /// Create a new CLI application from loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = OllamaClient::new(&config.ollama_host, config.request_timeout)?;
        let generator = LocatorGenerator::new(client, config.default_model.clone());
        info!("Using Ollama runtime at {}", config.ollama_host);
        Ok(Self { config, generator })
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn client(&self) -> &OllamaClient {
        self.generator.client()
    }

    /// Run a single command
    pub async fn run_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Serve { bind } => self.serve(bind.as_deref()).await,
            Commands::Generate(args) => self.generate(args).await.map(|_| ()),
            Commands::Pull { model } => self.pull(&model).await,
            Commands::Start { model } => self.start(&model).await,
            Commands::Stop { model } => self.stop(&model).await,
            Commands::List => self.list().await,
            Commands::Ps => self.ps().await,
        }
    }

    /// Start the HTTP API and block until shutdown
    async fn serve(&self, bind: Option<&str>) -> Result<()> {
        let addr = match bind {
            Some(raw) => parse_bind_addr(raw)?,
            None => self.config.bind_addr,
        };
        println!(
            "{} {}",
            "Serving locator API on".cyan(),
            format!("http://{}", addr).bold()
        );
        let state = AppState::new(self.generator.clone(), self.config.max_body_bytes);
        server::serve(addr, state).await
    }

    /// Generate one locator; returns the cleaned locator that was printed
    async fn generate(&self, args: GenerateArgs) -> Result<String> {
        let html = match (args.html, args.html_file) {
            (Some(html), None) => html,
            (None, Some(path)) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                AppError::Cli(format!("Could not read HTML file {}: {}", path.display(), e))
            })?,
            _ => {
                return Err(AppError::Cli(
                    "Provide exactly one of --html or --html-file".to_string(),
                ))
            },
        };
        if html.trim().is_empty() {
            return Err(AppError::Cli("HTML input is empty".to_string()));
        }
        if args.prompt.trim().is_empty() {
            return Err(AppError::Cli("Element description is empty".to_string()));
        }
        let model = match args.model.as_deref() {
            Some(name) => validate_model_name(name)?,
            None => self.default_model(),
        };

        let spinner = spinner(format!("Asking {}...", model))?;
        let result = self
            .generator
            .generate_clean(&html, &args.prompt, Some(model))
            .await;
        spinner.finish_and_clear();

        let locator = result?.ok_or_else(|| {
            AppError::Cli(format!("Model {} returned an empty reply", model))
        })?;

        println!("{}", locator.green().bold());
        match parse_locator(&locator) {
            Some(parsed) => {
                println!("{} {}", "Strategy:".dimmed(), parsed.strategy);
                println!("{} {}", "Selector:".dimmed(), parsed.value);
            },
            None => {
                warn!("Reply is not a recognised locator: {}", locator);
                println!(
                    "{}",
                    "Warning: the reply does not look like a Selenium locator.".yellow()
                );
            },
        }
        Ok(locator)
    }

    async fn pull(&self, model: &str) -> Result<()> {
        let model = validate_model_name(model)?;
        let bar = spinner(format!("Pulling {}...", model))?;
        let download_style = ProgressStyle::with_template(
            "{spinner:.green} {msg} [{elapsed}] {bar:30.cyan/blue} {bytes}/{total_bytes} ({eta})",
        )?;
        let result = self
            .client()
            .pull_model(model, |progress| {
                // Layer downloads carry byte counts; the other steps are just a status.
                if let Some(total) = progress.total {
                    if bar.length() != Some(total) {
                        bar.set_style(download_style.clone());
                        bar.set_length(total);
                    }
                    bar.set_position(progress.completed.unwrap_or(0));
                }
                bar.set_message(progress.status.clone());
            })
            .await;
        bar.finish_and_clear();

        let status = result?;
        println!(
            "{} {} ({})",
            "Pulled".green(),
            model.bold(),
            status.status
        );
        Ok(())
    }

    async fn start(&self, model: &str) -> Result<()> {
        let model = validate_model_name(model)?;
        let spinner = spinner(format!("Loading {}...", model))?;
        let result = self.client().load_model(model).await;
        spinner.finish_and_clear();

        result?;
        println!("{} {}", "Started".green(), model.bold());
        Ok(())
    }

    async fn stop(&self, model: &str) -> Result<()> {
        let model = validate_model_name(model)?;
        self.client().unload_model(model).await?;
        println!("{} {}", "Stopped".green(), model.bold());
        Ok(())
    }

    async fn list(&self) -> Result<()> {
        let models = self.client().list_models().await?;
        if models.is_empty() {
            println!(
                "{}",
                "No local models. Pull one with `locator-forge pull <model>`.".yellow()
            );
            return Ok(());
        }
        println!("{}", models_table(&models));
        Ok(())
    }

    async fn ps(&self) -> Result<()> {
        let models = self.client().running_models().await?;
        if models.is_empty() {
            println!("{}", "No models are currently loaded.".yellow());
            return Ok(());
        }
        println!("{}", running_table(&models));
        Ok(())
    }
}

fn spinner(message: String) -> Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")?);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}
