//! Guard for every file the decoders and the schema loader open
//!
//! A [`SourceGuard`] resolves a user-supplied path and refuses it when:
//!
//! - it climbs out through `..`, carries a NUL byte, or hides `..` behind
//!   percent-encoding
//! - its extension is not one the caller listed
//! - it is larger than the configured limit (checked from metadata, before a
//!   single byte is read)
//!
//! ```no_run
//! use gridyn_io::helpers::SourceGuard;
//!
//! let guard = SourceGuard::new()
//!     .with_extensions(&["dyr", "toml"])
//!     .size_limit(Some(10 * 1024 * 1024));
//!
//! let checked = guard.check(std::path::Path::new("case39.dyr"))?;
//! let text = checked.read_text()?;
//! # Ok::<(), gridyn_core::GridynError>(())
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use gridyn_core::{GridynError, GridynResult};
use thiserror::Error;

/// Size limit applied unless the caller asks otherwise: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Extensions accepted for dynamics sources and model schemas.
pub const DYNAMICS_EXTENSIONS: &[&str] = &["dyr", "toml", "txt", "yaml", "yml"];

#[derive(Debug, Clone, Error)]
pub enum GuardError {
    #[error("refusing path '{0}': it escapes its directory")]
    Traversal(String),
    #[error("'.{found}' files are not accepted here (expected one of: {})", .expected.join(", "))]
    Extension { found: String, expected: Vec<String> },
    #[error("file is {size} bytes, over the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
    #[error("no such file or directory: {}", .0.display())]
    Missing(PathBuf),
    #[error("expected a file, found a directory: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("cannot inspect '{}': {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

impl From<GuardError> for GridynError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::TooLarge { size, max } => GridynError::FileTooLarge { size, max },
            GuardError::Missing(ref path) => {
                let message = format!("no such file or directory: {}", path.display());
                GridynError::Io(io::Error::new(io::ErrorKind::NotFound, message))
            }
            other => GridynError::Other(other.to_string()),
        }
    }
}

/// A path that passed a [`SourceGuard`].
#[derive(Debug, Clone)]
pub struct CheckedPath {
    resolved: PathBuf,
    requested: PathBuf,
    bytes: u64,
    directory: bool,
}

impl CheckedPath {
    /// The canonical path the guard resolved.
    pub fn path(&self) -> &Path {
        &self.resolved
    }

    /// The path as the caller spelled it.
    pub fn requested(&self) -> &Path {
        &self.requested
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// Read the whole file as UTF-8 text.
    pub fn read_text(&self) -> GridynResult<String> {
        fs::read_to_string(&self.resolved).map_err(|e| {
            let message = format!("reading '{}': {}", self.requested.display(), e);
            GridynError::Io(io::Error::new(e.kind(), message))
        })
    }
}

/// Policy for which paths may be opened.
///
/// An empty extension list accepts any extension. Directories are refused
/// unless [`SourceGuard::directories`] enables them; size and extension
/// checks only apply to files.
#[derive(Debug, Clone)]
pub struct SourceGuard {
    extensions: Vec<String>,
    size_limit: Option<u64>,
    directories: bool,
}

impl Default for SourceGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceGuard {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
            size_limit: Some(DEFAULT_MAX_FILE_SIZE),
            directories: false,
        }
    }

    /// Guard for dynamics sources: [`DYNAMICS_EXTENSIONS`] and the default limit.
    pub fn for_dynamics_sources() -> Self {
        Self::new().with_extensions(DYNAMICS_EXTENSIONS)
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        for ext in extensions {
            let ext = ext.to_ascii_lowercase();
            if !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }
        self.extensions.sort();
        self
    }

    /// `None` lifts the limit.
    pub fn size_limit(mut self, limit: Option<u64>) -> Self {
        self.size_limit = limit;
        self
    }

    pub fn directories(mut self, allow: bool) -> Self {
        self.directories = allow;
        self
    }

    pub fn check(&self, path: &Path) -> Result<CheckedPath, GuardError> {
        reject_traversal(path)?;

        let resolved = path.canonicalize().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => GuardError::Missing(path.to_path_buf()),
            _ => GuardError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        let metadata = fs::metadata(&resolved).map_err(|e| GuardError::Unreadable {
            path: resolved.clone(),
            reason: e.to_string(),
        })?;

        let directory = metadata.is_dir();
        if directory && !self.directories {
            return Err(GuardError::NotAFile(path.to_path_buf()));
        }
        if !directory {
            self.accept_extension(&resolved)?;
            match self.size_limit {
                Some(max) if metadata.len() > max => {
                    return Err(GuardError::TooLarge {
                        size: metadata.len(),
                        max,
                    });
                }
                _ => {}
            }
        }

        Ok(CheckedPath {
            resolved,
            requested: path.to_path_buf(),
            bytes: metadata.len(),
            directory,
        })
    }

    fn accept_extension(&self, path: &Path) -> Result<(), GuardError> {
        if self.extensions.is_empty() {
            return Ok(());
        }
        let found = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if self.extensions.contains(&found) {
            Ok(())
        } else {
            Err(GuardError::Extension {
                found,
                expected: self.extensions.clone(),
            })
        }
    }
}

fn reject_traversal(path: &Path) -> Result<(), GuardError> {
    let has_parent = path.components().any(|c| matches!(c, Component::ParentDir));
    let text = path.to_string_lossy();
    let lowered = text.to_ascii_lowercase();
    if has_parent
        || text.contains('\0')
        || lowered.contains("%2e%2e")
        || lowered.contains("%252e")
    {
        return Err(GuardError::Traversal(text.into_owned()));
    }
    Ok(())
}
