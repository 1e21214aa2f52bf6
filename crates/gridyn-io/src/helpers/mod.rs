pub mod source_guard;

use std::path::Path;

use gridyn_core::GridynResult;
use tracing::debug;

pub use source_guard::{
    CheckedPath, GuardError, SourceGuard, DEFAULT_MAX_FILE_SIZE, DYNAMICS_EXTENSIONS,
};

/// Options for the path-based decode entry points.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Reject sources larger than this many bytes (None = no limit)
    pub max_file_size: Option<u64>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

impl DecodeOptions {
    pub fn with_max_file_size(mut self, max: Option<u64>) -> Self {
        self.max_file_size = max;
        self
    }

    fn guard(&self) -> SourceGuard {
        SourceGuard::for_dynamics_sources().size_limit(self.max_file_size)
    }
}

/// Validate `path` against the size guard and read it.
pub(crate) fn read_source(path: &Path, options: &DecodeOptions) -> GridynResult<String> {
    let checked = options.guard().check(path)?;
    debug!(path = %checked.path().display(), bytes = checked.bytes(), "reading source");
    checked.read_text()
}
