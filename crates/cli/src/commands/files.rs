//! `ls`, `read` and `write`.

use std::path::Path;

use oli_core::Prompter;
use oli_tools::{list_dir, read_file, write_file};

use super::RULE;
use crate::terminal::TerminalPrompter;

/// Line that ends `write` input.
const END_OF_INPUT: &str = "EOF";

pub async fn ls(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let names = list_dir(path).await?;
    println!();
    for name in names {
        println!("  {name}");
    }
    println!();
    Ok(())
}

pub async fn read(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = read_file(path).await?;
    println!("\n{RULE}");
    println!("{content}");
    println!("{RULE}");
    Ok(())
}

/// Collect lines up to `EOF`, confirm, then write.
pub async fn write(
    path: &Path,
    prompter: &mut TerminalPrompter,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(" Enter the content (finish with a line containing only '{END_OF_INPUT}'):");
    println!("{RULE}");

    let mut lines = Vec::new();
    while let Some(line) = prompter.read_line().await {
        if line == END_OF_INPUT {
            break;
        }
        lines.push(line);
    }
    let content = lines.join("\n");

    let action = if path.exists() { "Overwrite" } else { "Create" };
    if !prompter
        .confirm(&format!("{action} file '{}'?", path.display()))
        .await
    {
        println!(" Not written.");
        return Ok(());
    }

    let bytes = write_file(path, &content).await?;
    println!(" Saved {} ({bytes} bytes)", path.display());
    Ok(())
}
