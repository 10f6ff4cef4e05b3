//! Command-line interface definition and dispatch for aether.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler.

use crate::{app, assistant::AssistantService, chat, config, error::TurnError, output};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Top-level CLI structure for aether.
#[derive(Parser)]
#[command(
    name = "aether",
    about = "A streaming assistant with web search and content extraction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the aether CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Start an interactive chat session
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Manage remote assistants
    Assistant {
        #[command(subcommand)]
        action: AssistantAction,
    },
    /// Print the tool definitions sent to the assistant
    Tools,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum AssistantAction {
    /// Create an assistant from config and print its id
    Create,
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask { prompt, model } => {
            let prompt = prompt.join(" ");
            if prompt.is_empty() {
                anyhow::bail!("No prompt provided. Usage: aether ask \"your question here\"");
            }

            let config = load_config(model)?;
            let app = app::App::from_config(&config)?;

            println!(
                "{} [model: {}]",
                "aether".bold().cyan(),
                config.model.yellow(),
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            let mut renderer = output::StdoutRenderer::new();
            match app.ask(&prompt, &mut renderer).await {
                Ok(_) => Ok(()),
                Err(TurnError::Cancelled) => {
                    println!("\n{}", "cancelled.".dimmed());
                    Ok(())
                }
                Err(err) => Err(err.into()),
            }
        }
        Commands::Chat { model } => {
            let config = load_config(model)?;
            chat::run_chat(config).await
        }
        Commands::Assistant {
            action: AssistantAction::Create,
        } => {
            let config = config::Config::load()?;
            let service = crate::assistant::OpenAiAssistants::from_config(&config)?;
            let registry = app::descriptor_registry(&config)?;
            let definition = app::assistant_definition(&config, &registry);

            let id = service.create_assistant(&definition).await?;
            println!("{} {}", "Created assistant:".bold(), id.yellow());
            println!(
                "{}",
                format!("Set assistant.id = \"{}\" in config to reuse it.", id).dimmed()
            );
            Ok(())
        }
        Commands::Tools => {
            let config = config::Config::load()?;
            let registry = app::descriptor_registry(&config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&registry.descriptors())?
            );
            Ok(())
        }
        Commands::Config { action } => {
            let config = config::Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = config::Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let toml_str = toml::to_string_pretty(&config)?;
                    println!("{}", toml_str);
                }
            }
            Ok(())
        }
    }
}

fn load_config(model: Option<String>) -> Result<config::Config> {
    let mut config = config::Config::load()?;
    if let Some(model) = model {
        config.model = model;
    }
    Ok(config)
}
