//! CLI module for DocChat
//!
//! Provides command-line interface parsing and handling for the docchat-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;
pub mod repl;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocChat - conversational question answering over your documents
#[derive(Parser, Debug)]
#[command(
    name = "docchat-server",
    version,
    about = "DocChat - chat with an assistant, or upload a document and ask about it",
    long_about = "A conversational question-answering server. Questions are answered by a\n\
                  general chat assistant with memory until a document is uploaded; after that,\n\
                  an agent answers from the document by searching its embedding index.\n\n\
                  Run without arguments to start the HTTP server.",
    after_help = "EXAMPLES:\n    \
                  docchat-server                    # Start the server (docchat.toml is optional)\n    \
                  docchat-server serve --port 9000  # Start on a different port\n    \
                  docchat-server chat               # Interactive terminal session\n    \
                  docchat-server config             # Show the effective configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "docchat.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,

        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Interactive terminal session
    ///
    /// `upload <path>` loads a document, `reset` returns to general chat,
    /// `exit` quits. Anything else is asked as a question.
    Chat,

    /// Show the effective configuration
    Config,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["docchat-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("docchat.toml"));
        assert!(!cli.no_color);
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["docchat-server", "serve", "--port", "9000", "--no-color"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(cli.no_color);
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["docchat-server", "chat", "-c", "other.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Chat)));
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
