//! CLI argument definitions using clap
//!
//! Commands:
//! - rowgate serve --config <path>
//! - rowgate tables --config <path>
//! - rowgate token --config <path> --subject <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowgate - relational tables as filterable HTTP resources
#[derive(Parser, Debug)]
#[command(name = "rowgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the database and serve every configured table over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./rowgate.json")]
        config: PathBuf,
    },

    /// Print the tables that would be served, with their columns, and exit
    Tables {
        /// Path to configuration file
        #[arg(long, default_value = "./rowgate.json")]
        config: PathBuf,
    },

    /// Mint a bearer token for a subject (jwt identity only)
    Token {
        /// Path to configuration file
        #[arg(long, default_value = "./rowgate.json")]
        config: PathBuf,

        /// Identity placed in the `sub` claim
        #[arg(long)]
        subject: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_default_config_path() {
        let cli = Cli::try_parse_from(["rowgate", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config } => assert_eq!(config, PathBuf::from("./rowgate.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_token_requires_subject() {
        assert!(Cli::try_parse_from(["rowgate", "token"]).is_err());

        let cli = Cli::try_parse_from(["rowgate", "token", "--subject", "u-1"]).unwrap();
        assert!(matches!(cli.command, Command::Token { subject, .. } if subject == "u-1"));
    }
}
