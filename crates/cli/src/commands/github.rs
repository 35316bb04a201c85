//! GitHub commands: `repos`, `repo`, `clone`, `cat`, `issues`, `prs`.

use std::path::Path;

use oli_agent::Assistant;
use oli_core::ContextUnit;
use oli_tools::{GitHubCli, format_repo_info};
use tokio_util::sync::CancellationToken;

use super::RULE;
use super::run::report;
use crate::terminal::{InterruptGuard, TerminalPrompter};

const DEFAULT_REVIEW_QUESTION: &str =
    "Analyze this repository: summarize what it does, describe its structure and suggest improvements.";

pub async fn repos(gh: &GitHubCli, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("\n Fetching repositories...");
    let listing = gh.list_repos(limit).await?;
    println!("\n Your repositories:");
    println!("{RULE}");
    println!("{listing}");
    Ok(())
}

/// Show a repository overview, then ask the model about it.
pub async fn review(
    assistant: &Assistant,
    gh: &GitHubCli,
    repo: &str,
    question: &str,
    prompter: &mut TerminalPrompter,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("\n Fetching {repo}...");
    let info = gh.repo_info(repo).await?;
    let overview = format_repo_info(&info);

    println!("{RULE}");
    println!("{overview}");
    println!("{RULE}");

    let question = if question.trim().is_empty() {
        DEFAULT_REVIEW_QUESTION
    } else {
        question
    };

    let mut context = overview;
    if !info.readme.is_empty() {
        context.push_str("\n\nREADME:\n");
        context.push_str(&info.readme);
    }
    let units = vec![ContextUnit::content("github", context)];

    let root = std::env::current_dir()?;
    let cancel = CancellationToken::new();
    let _guard = InterruptGuard::cancel_on_interrupt(cancel.clone());

    let result = assistant
        .run_with_context(question, units, &root, &cancel, prompter, &mut std::io::stdout())
        .await;
    report(result)
}

pub async fn clone(
    gh: &GitHubCli,
    repo: &str,
    dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("\n Cloning {repo}...");
    gh.clone_repo(repo, dir).await?;
    println!(" Cloned {repo}");
    Ok(())
}

/// Print one file of a repository's default branch.
pub async fn cat(gh: &GitHubCli, repo: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = gh.repo_file(repo, path).await?;
    println!("{text}");
    Ok(())
}

pub async fn issues(gh: &GitHubCli, repo: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n Issues for {repo}:");
    println!("{RULE}");
    let issues = gh.repo_issues(repo).await?;
    if issues.trim().is_empty() {
        println!(" No open issues");
    } else {
        println!("{issues}");
    }
    Ok(())
}

pub async fn prs(gh: &GitHubCli, repo: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n Pull requests for {repo}:");
    println!("{RULE}");
    let prs = gh.repo_prs(repo).await?;
    if prs.trim().is_empty() {
        println!(" No open pull requests");
    } else {
        println!("{prs}");
    }
    Ok(())
}
