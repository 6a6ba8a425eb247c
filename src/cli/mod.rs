//! CLI module for Lectio.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lectio - lecture summaries, quizzes and flashcards
///
/// Turns a lecture recording, slide deck, PDF or transcript into a summary,
/// quiz questions, flashcards and localized summaries.
#[derive(Parser, Debug)]
#[command(name = "lectio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LECTIO_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a lecture file and store the generated study material
    Process {
        /// Video, audio, PDF, PPTX, text or markdown file
        file: String,

        /// Target locale for the localized summary (repeatable, e.g. -l hi-IN -l es-ES)
        #[arg(short, long = "locale")]
        locales: Vec<String>,

        /// Also write the result JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start the upload server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_with_locales() {
        let cli = Cli::parse_from([
            "lectio", "process", "week1.mp4", "-l", "hi-IN", "--locale", "es-ES", "-o", "out.json",
        ]);
        match cli.command {
            Commands::Process { file, locales, output } => {
                assert_eq!(file, "week1.mp4");
                assert_eq!(locales, vec!["hi-IN", "es-ES"]);
                assert_eq!(output.as_deref(), Some("out.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["lectio", "-vv", "serve"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Serve { port: 8000, .. }));
    }
}
