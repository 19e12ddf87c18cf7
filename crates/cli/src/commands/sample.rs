use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use super::load_intents;

/// Enumerate concrete sentences that an intent's templates can expand to.
#[derive(Debug, Args)]
pub struct Sample {
    /// Name of the intent to sample.
    intent: String,

    /// Path to the intents YAML document.
    #[arg(short, long)]
    intents: PathBuf,

    /// Maximum number of samples to print.
    #[arg(short, long, default_value_t = 20)]
    limit: usize,
}

impl Sample {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        let doc = load_intents(&self.intents)?;
        let intent = doc
            .intents
            .get(&self.intent)
            .ok_or_else(|| anyhow::anyhow!("no such intent `{}`", self.intent))?;

        let rules = doc.expansion_rule_sequences();
        let mut count = 0;
        for data in &intent.data {
            for sentence in data.sentences()? {
                for sample in intently_core::sampler::sample_sequence(&sentence.root, &doc.slot_lists, &rules)? {
                    if count >= self.limit {
                        return Ok(ExitCode::SUCCESS);
                    }
                    println!("{sample}");
                    count += 1;
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
