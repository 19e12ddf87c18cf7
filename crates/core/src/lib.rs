//! Template-based natural language intent recognizer.
//!
//! Given a document of named intents, each backed by one or more sentence
//! templates, this crate recognizes which intent (if any) a piece of input
//! text expresses, and extracts the named entities (`{list}` references) it
//! contains. See [`recognize`], [`recognize_all`], and [`recognize_best`].

pub mod error;
pub mod expression;
pub mod intents;
pub mod matcher;
pub mod normalize;
pub mod numbers;
pub mod parser;
pub mod recognize;
pub mod sampler;
pub mod slots;
pub mod trie;

pub use error::{Error, Result};
pub use intents::{Intent, IntentData, Intents};
pub use matcher::{MatchContext, MatchEntity, MatchSettings, UnmatchedEntity};
pub use recognize::{recognize, recognize_all, recognize_best, RecognizeOptions, RecognizeResult};
