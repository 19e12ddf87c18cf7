//! Error types for template parsing and sentence matching.

use thiserror::Error;

/// Errors that can occur while parsing or matching sentence templates.
#[derive(Debug, Error)]
pub enum Error {
    /// A template failed to parse.
    #[error("failed to parse template `{text}`: {reason}")]
    Parse {
        /// The offending chunk of text.
        text: String,
        /// Human-readable description of what went wrong.
        reason: String,
        /// Source file the template came from, if known.
        file: Option<String>,
        /// Line number within `file`, if known.
        line: Option<usize>,
        /// Name of the intent the template belongs to, if known.
        intent: Option<String>,
    },

    /// A `{list_name}` reference did not resolve to a known slot list.
    #[error("missing slot list `{name}`")]
    MissingList {
        /// Name of the missing list.
        name: String,
    },

    /// A `<rule_name>` reference did not resolve to a known expansion rule.
    #[error("missing expansion rule `{name}`")]
    MissingRule {
        /// Name of the missing rule.
        name: String,
    },

    /// A slot list or range definition failed validation.
    #[error("invalid value: {0}")]
    Value(String),
}

impl Error {
    pub fn parse(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            text: text.into(),
            reason: reason.into(),
            file: None,
            line: None,
            intent: None,
        }
    }

    #[must_use]
    pub fn with_location(
        mut self,
        file: Option<&str>,
        line: Option<usize>,
        intent: Option<&str>,
    ) -> Self {
        if let Error::Parse {
            file: f,
            line: l,
            intent: i,
            ..
        } = &mut self
        {
            *f = file.map(str::to_owned);
            *l = line;
            *i = intent.map(str::to_owned);
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, Error>;
