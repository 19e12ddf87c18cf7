mod recognize;
mod sample;
mod validate;

pub use recognize::Recognize;
pub use sample::Sample;
pub use validate::Validate;

use std::fs::File;
use std::path::Path;

use intently_core::Intents;

/// Load an intents document from disk.
fn load_intents(path: &Path) -> anyhow::Result<Intents> {
    let file = File::open(path).map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.display()))?;
    intently_util::yaml::parse_yaml(file)
}
