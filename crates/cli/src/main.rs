//! oli CLI: the main entry point.
//!
//! Usage:
//! - `oli <task...>`               Run one task against the current directory
//! - `oli`                         Interactive session
//! - `oli ls|read|prompts`         Local helpers
//! - `oli repos|repo|cat|...`      GitHub helpers (via `gh`)

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oli_config::AppConfig;
use oli_tools::GitHubCli;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(
    name = "oli",
    about = "oli: a workspace-aware code assistant for local models",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "Run `oli` with no arguments for the interactive session; type `help` there for its commands."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Task to run once in the current directory
    #[arg(trailing_var_arg = true)]
    task: Vec<String>,

    /// Model to use (overrides config and OLLAMA_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// System prompt to use (overrides config and OLI_PROMPT)
    #[arg(short, long, global = true)]
    prompt: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory
    Ls {
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print a file
    Read { path: PathBuf },

    /// List the available system prompts
    Prompts,

    /// List your GitHub repositories
    Repos {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Review a GitHub repository, optionally asking a question about it
    Repo {
        /// Repository as owner/name
        repo: String,

        /// Question about the repository
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Clone a GitHub repository
    Clone {
        repo: String,
        dir: Option<PathBuf>,
    },

    /// Print a file from a GitHub repository
    Cat { repo: String, path: String },

    /// Show open issues of a GitHub repository
    Issues { repo: String },

    /// Show open pull requests of a GitHub repository
    Prs { repo: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the model's answer.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(prompt) = cli.prompt {
        config.select_prompt(&prompt)?;
    }

    let gh = GitHubCli::new();

    match cli.command {
        Some(Commands::Ls { path }) => commands::files::ls(&path).await?,
        Some(Commands::Read { path }) => commands::files::read(&path).await?,
        Some(Commands::Prompts) => commands::prompts::run(&config),
        Some(Commands::Repos { limit }) => commands::github::repos(&gh, limit).await?,
        Some(Commands::Repo { repo, question }) => {
            let assistant = commands::run::assistant(&config);
            let mut prompter = terminal::TerminalPrompter::new();
            commands::github::review(&assistant, &gh, &repo, &question.join(" "), &mut prompter)
                .await?;
        }
        Some(Commands::Clone { repo, dir }) => {
            commands::github::clone(&gh, &repo, dir.as_deref()).await?
        }
        Some(Commands::Cat { repo, path }) => commands::github::cat(&gh, &repo, &path).await?,
        Some(Commands::Issues { repo }) => commands::github::issues(&gh, &repo).await?,
        Some(Commands::Prs { repo }) => commands::github::prs(&gh, &repo).await?,
        None if cli.task.is_empty() => commands::repl::run(&config).await?,
        None => {
            let assistant = commands::run::assistant(&config);
            let mut prompter = terminal::TerminalPrompter::new();
            commands::run::run(&assistant, &cli.task.join(" "), &mut prompter).await?;
        }
    }

    Ok(())
}
