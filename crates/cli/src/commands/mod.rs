pub mod files;
pub mod github;
pub mod prompts;
pub mod repl;
pub mod run;

pub const RULE: &str = "────────────────────────────────";

pub const HELP: &str = "
 oli - code assistant for local models

 INTERACTIVE:
   oli                          Start the interactive session

 LOCAL COMMANDS:
   help                         This help
   prompts                      List system prompts
   ls [dir]                     List files
   read <file>                  Print a file
   write <file>                 Write a file (end input with a line 'EOF')
   pwd                          Current directory
   cd <dir>                     Change directory
   exit | quit                  Leave

 GITHUB COMMANDS (via gh):
   repos                        List your repositories
   repo <owner/name> [question] Review a repository
   clone <owner/name>           Clone a repository
   cat <owner/name> <path>      Print a file from a repository
   issues <owner/name>          Open issues
   prs <owner/name>             Open pull requests

 ONE-SHOT:
   oli <task...>                Run a single task in the current directory
   oli repo <owner/name> [...]  Review a repository directly

 ENVIRONMENT:
   OLLAMA_MODEL                 Model to use
   OLLAMA_URL                   Ollama server URL
   OLI_PROMPT                   System prompt name
   RUST_LOG                     Log filter (default: warn)

 EXAMPLES:
   oli what does this project do
   oli add tests for parser.go
   oli repo rust-lang/log what is the public API
";
