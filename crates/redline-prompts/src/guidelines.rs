use std::io;
use std::path::Path;

use tracing::{info, warn};

/// Used when no guideline file exists. `{text}` is left as a literal
/// placeholder; the text itself is appended by the rewrite prompt.
pub const DEFAULT_GUIDELINES: &str = "Correct the grammar of the following text:\n{text}\n";

/// Load editorial guidelines from `path`, trimmed.
///
/// A missing file yields [`DEFAULT_GUIDELINES`]. Every other I/O error is
/// returned to the caller.
pub fn load_guidelines(path: &Path) -> io::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            info!("loaded guidelines from {}", path.display());
            Ok(contents.trim().to_string())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "guideline file {} not found, using default guidelines",
                path.display()
            );
            Ok(DEFAULT_GUIDELINES.to_string())
        }
        Err(e) => Err(e),
    }
}
