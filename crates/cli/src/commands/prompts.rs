//! `oli prompts`: list the available system prompts.

use oli_config::AppConfig;

pub fn run(config: &AppConfig) {
    let library = config.prompt_library();
    println!("\n Available prompts:");
    println!(" ──────────────────");
    for name in library.names() {
        let marker = if name == config.prompt { "*" } else { " " };
        println!("  {marker} {name}");
    }
    println!("\n Select one with OLI_PROMPT=<name> or --prompt <name>.");
    println!(
        " Add your own under [prompts] in {}\n",
        AppConfig::config_dir().join("config.toml").display()
    );
}
