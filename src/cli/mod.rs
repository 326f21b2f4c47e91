//! Command-line interface, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::{cmd_export, cmd_init};

/// Lost & Found - a registry for lost and found items
#[derive(Debug, Parser)]
#[command(name = "lostfound")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Write every item to a spreadsheet
    Export {
        /// Destination file (default: export.path from config)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["lostfound"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn export_accepts_output_and_config() {
        let cli = Cli::try_parse_from([
            "lostfound",
            "export",
            "--output",
            "out/report.xlsx",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Some(Commands::Export { output }) => {
                assert_eq!(output, Some(PathBuf::from("out/report.xlsx")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
