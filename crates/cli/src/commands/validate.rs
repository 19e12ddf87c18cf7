use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use super::load_intents;

/// Load and parse an intents document, reporting any parse errors.
#[derive(Debug, Args)]
pub struct Validate {
    /// Path to the intents YAML document.
    #[arg(short, long)]
    intents: PathBuf,
}

impl Validate {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        let doc = load_intents(&self.intents)?;

        let mut errors = Vec::new();
        for (intent_name, intent) in &doc.intents {
            for data in &intent.data {
                if let Err(error) = data.sentences() {
                    errors.push(format!("{intent_name}: {error}"));
                }
            }
        }
        for (rule_name, _) in &doc.expansion_rules {
            tracing::debug!(rule = rule_name, "expansion rule parsed");
        }

        if errors.is_empty() {
            println!(
                "ok: {} intent(s), {} slot list(s), {} expansion rule(s)",
                doc.intents.len(),
                doc.slot_lists.len(),
                doc.expansion_rules.len()
            );
            Ok(ExitCode::SUCCESS)
        } else {
            for error in &errors {
                eprintln!("error: {error}");
            }
            Ok(ExitCode::from(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use intently_core::Intents;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::valid_template("turn on [the] {area} light[s]", true)]
    #[case::unterminated_group("turn on (the light", false)]
    fn test_sentence_validity(#[case] template: &str, #[case] expect_ok: bool) {
        let yaml = format!(
            "language: en\nintents:\n  Test:\n    data:\n      - sentences:\n          - \"{template}\"\n"
        );
        let doc = Intents::from_yaml_str(&yaml).unwrap();
        let data = &doc.intents["Test"].data[0];
        assert_eq!(data.sentences().is_ok(), expect_ok);
    }
}
