//! The interactive session.
//!
//! Built-in commands are handled locally; any other line is a task for the
//! model, run against whatever the current directory is at that moment.

use std::io::Write;
use std::path::Path;

use oli_agent::Assistant;
use oli_config::AppConfig;
use oli_tools::GitHubCli;

use super::{HELP, files, github, prompts, run as one_shot};
use crate::terminal::TerminalPrompter;

const REPOS_LIMIT: usize = 20;

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Help,
    Prompts,
    Ls(&'a str),
    Read(&'a str),
    Write(&'a str),
    Pwd,
    Cd(&'a str),
    Repos,
    Repo { repo: &'a str, question: String },
    Clone(&'a str),
    Cat { repo: &'a str, path: &'a str },
    Issues(&'a str),
    Prs(&'a str),
    Usage(&'static str),
    Task(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let arg = parts.get(1).copied();

    match (parts.first().copied().unwrap_or_default(), arg) {
        ("exit" | "quit" | "salir", _) => Command::Exit,
        ("help", _) => Command::Help,
        ("prompts", _) => Command::Prompts,
        ("ls", path) => Command::Ls(path.unwrap_or(".")),
        ("read", Some(path)) => Command::Read(path),
        ("read", None) => Command::Usage("read <file>"),
        ("write", Some(path)) => Command::Write(path),
        ("write", None) => Command::Usage("write <file>"),
        ("pwd", _) => Command::Pwd,
        ("cd", Some(dir)) => Command::Cd(dir),
        ("cd", None) => Command::Usage("cd <dir>"),
        ("repos", _) => Command::Repos,
        ("repo", Some(repo)) => Command::Repo {
            repo,
            question: parts[2..].join(" "),
        },
        ("repo", None) => Command::Usage("repo <owner/name> [question]"),
        ("clone", Some(repo)) => Command::Clone(repo),
        ("clone", None) => Command::Usage("clone <owner/name>"),
        ("cat", Some(repo)) => match parts.get(2) {
            Some(path) => Command::Cat { repo, path },
            None => Command::Usage("cat <owner/name> <path>"),
        },
        ("cat", None) => Command::Usage("cat <owner/name> <path>"),
        ("issues", Some(repo)) => Command::Issues(repo),
        ("issues", None) => Command::Usage("issues <owner/name>"),
        ("prs", Some(repo)) => Command::Prs(repo),
        ("prs", None) => Command::Usage("prs <owner/name>"),
        _ => Command::Task(line),
    }
}

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let assistant = one_shot::assistant(config);
    let gh = GitHubCli::new();
    let mut prompter = TerminalPrompter::new();

    one_shot::check_backend(config).await;
    println!("\n oli ({})", assistant.model());
    println!(" Commands: help | repos | repo <name> | ls | read | write | exit\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = prompter.read_line() => line,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match parse(line) {
            Command::Exit => break,
            Command::Task(task) => {
                let result = one_shot::run(&assistant, task, &mut prompter).await;
                println!();
                result
            }
            command => dispatch(command, config, &assistant, &gh, &mut prompter).await,
        };

        if let Err(e) = result {
            eprintln!(" Error: {e}");
        }
    }

    println!("\n Bye!");
    Ok(())
}

async fn dispatch(
    command: Command<'_>,
    config: &AppConfig,
    assistant: &Assistant,
    gh: &GitHubCli,
    prompter: &mut TerminalPrompter,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Help => println!("{HELP}"),
        Command::Prompts => prompts::run(config),
        Command::Ls(path) => files::ls(Path::new(path)).await?,
        Command::Read(path) => files::read(Path::new(path)).await?,
        Command::Write(path) => files::write(Path::new(path), prompter).await?,
        Command::Pwd => println!("{}", std::env::current_dir()?.display()),
        Command::Cd(dir) => {
            std::env::set_current_dir(dir)?;
            println!("{}", std::env::current_dir()?.display());
        }
        Command::Repos => github::repos(gh, REPOS_LIMIT).await?,
        Command::Repo { repo, question } => {
            github::review(assistant, gh, repo, &question, prompter).await?;
        }
        Command::Clone(repo) => github::clone(gh, repo, None).await?,
        Command::Cat { repo, path } => github::cat(gh, repo, path).await?,
        Command::Issues(repo) => github::issues(gh, repo).await?,
        Command::Prs(repo) => github::prs(gh, repo).await?,
        Command::Usage(usage) => println!(" Usage: {usage}"),
        Command::Exit | Command::Task(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtins() {
        assert_eq!(parse("exit"), Command::Exit);
        assert_eq!(parse("salir"), Command::Exit);
        assert_eq!(parse("ls"), Command::Ls("."));
        assert_eq!(parse("ls src"), Command::Ls("src"));
        assert_eq!(parse("read main.go"), Command::Read("main.go"));
        assert_eq!(parse("cd"), Command::Usage("cd <dir>"));
        assert_eq!(parse("issues"), Command::Usage("issues <owner/name>"));
        assert_eq!(
            parse("cat rust-lang/log src/lib.rs"),
            Command::Cat {
                repo: "rust-lang/log",
                path: "src/lib.rs"
            }
        );
        assert_eq!(parse("cat rust-lang/log"), Command::Usage("cat <owner/name> <path>"));
    }

    #[test]
    fn repo_takes_a_question() {
        assert_eq!(
            parse("repo rust-lang/log what is the API"),
            Command::Repo {
                repo: "rust-lang/log",
                question: "what is the API".into()
            }
        );
        assert_eq!(
            parse("repo rust-lang/log"),
            Command::Repo {
                repo: "rust-lang/log",
                question: String::new()
            }
        );
    }

    #[test]
    fn anything_else_is_a_task() {
        assert_eq!(
            parse("explain how main.go works"),
            Command::Task("explain how main.go works")
        );
        assert_eq!(parse("reading list"), Command::Task("reading list"));
    }
}
