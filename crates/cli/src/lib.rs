#![forbid(unsafe_code)]

//! CLI front end for the intent recognizer: load an intents YAML document
//! and run `recognize`/`sample`/`validate` against it.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

pub use commands::{Recognize, Sample, Validate};

/// Recognize natural-language commands against a template-based intents
/// document.
#[derive(Debug, Parser)]
#[command(name = "intently", version)]
pub struct Args {
    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recognize a single line of text against an intents document.
    Recognize(Recognize),
    /// Enumerate concrete sentences a template can expand to.
    Sample(Sample),
    /// Load and parse an intents document, reporting any errors.
    Validate(Validate),
}

impl Command {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        match self {
            Command::Recognize(cmd) => cmd.execute(),
            Command::Sample(cmd) => cmd.execute(),
            Command::Validate(cmd) => cmd.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_recognize_args() {
        let args = Args::parse_from([
            "intently",
            "recognize",
            "turn on the kitchen lights",
            "--intents",
            "intents.yaml",
            "--all",
        ]);
        assert!(matches!(args.command, Command::Recognize(_)));
    }

    #[test]
    fn test_parse_validate_args() {
        let args = Args::parse_from(["intently", "validate", "--intents", "intents.yaml"]);
        assert!(matches!(args.command, Command::Validate(_)));
    }

    #[test]
    fn test_all_and_best_are_mutually_exclusive() {
        let result = Args::try_parse_from([
            "intently",
            "recognize",
            "text",
            "--intents",
            "intents.yaml",
            "--all",
            "--best",
        ]);
        assert!(result.is_err());
    }
}
