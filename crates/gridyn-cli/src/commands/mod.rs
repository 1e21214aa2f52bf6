pub mod convert;
pub mod decode;
pub mod schemas;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gridyn_core::SchemaRegistry;
use gridyn_io::load_registry;
use gridyn_cli::GridynConfig;

/// The `--schemas` flag wins over `core.schema_dir`.
fn schema_dir(flag: Option<&Path>, config: &GridynConfig) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.core.schema_dir.clone())
}

/// Load the schema registry, or `None` when no directory is configured.
pub fn load_schemas(flag: Option<&Path>, config: &GridynConfig) -> Result<Option<SchemaRegistry>> {
    let Some(dir) = schema_dir(flag, config) else {
        return Ok(None);
    };
    let registry = load_registry(&dir)
        .with_context(|| format!("loading schemas from '{}'", dir.display()))?;
    Ok(Some(registry))
}

/// Like [`load_schemas`], but a schema directory is mandatory.
pub fn require_schemas(flag: Option<&Path>, config: &GridynConfig) -> Result<SchemaRegistry> {
    load_schemas(flag, config)?.context("no schema directory; pass --schemas or set core.schema_dir")
}
