use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use intently_core::{recognize, recognize_all, recognize_best};

use super::load_intents;

/// Recognize a line of text against an intents document.
#[derive(Debug, Args)]
pub struct Recognize {
    /// Text to recognize.
    text: String,

    /// Path to the intents YAML document.
    #[arg(short, long)]
    intents: PathBuf,

    /// Show every match instead of just the first.
    #[arg(long, conflicts_with = "best")]
    all: bool,

    /// Show only the highest-ranked match.
    #[arg(long)]
    best: bool,

    /// Print results as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,
}

impl Recognize {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        let intents = load_intents(&self.intents)?;
        let options = intently_core::RecognizeOptions::default();

        let results = if self.all {
            recognize_all(&self.text, &intents, &options)?
        } else if self.best {
            recognize_best(&self.text, &intents, &options)?.into_iter().collect()
        } else {
            recognize(&self.text, &intents, &options)?.into_iter().collect()
        };

        if results.is_empty() {
            if self.json {
                println!("null");
            } else {
                println!("no intent matched");
            }
            return Ok(ExitCode::from(1));
        }

        for result in &results {
            if self.json {
                let entities: serde_json::Map<String, serde_json::Value> = result
                    .entities
                    .iter()
                    .map(|(name, entity)| (name.clone(), entity.value.clone()))
                    .collect();
                let doc = serde_json::json!({
                    "intent": result.intent_name,
                    "entities": entities,
                });
                println!("{doc}");
            } else {
                println!("intent: {}", result.intent_name);
                for (name, entity) in &result.entities {
                    println!("  {name}: {}", entity.value);
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
