use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gridyn_cli::{ConvertArgs, ConvertTarget, GridynConfig};
use gridyn_io::{reencode, DecodeResult, Format};
use tracing::{info, warn};

use super::load_schemas;

pub fn handle(args: &ConvertArgs, config: &GridynConfig) -> Result<()> {
    let registry = load_schemas(args.schemas.as_deref(), config)?;
    let options = config.decode_options();

    let result = Format::decode(&args.input, registry.as_ref(), &options)
        .with_context(|| format!("decoding '{}'", args.input.display()))?;
    if result.has_issues() {
        warn!(
            issues = result.issues.len(),
            "source has validation issues; missing cells are left out of the output"
        );
    }

    match args.to {
        ConvertTarget::Toml => write_toml(&result, args.output.as_deref()),
        ConvertTarget::Arrow => {
            let dir = args
                .output
                .as_deref()
                .context("--to arrow needs an output directory (-o)")?;
            write_arrow(&result, dir)
        }
    }
}

fn write_toml(result: &DecodeResult<'_>, output: Option<&Path>) -> Result<()> {
    let text = reencode(result, None)?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing '{}'", path.display()))?;
            info!(
                path = %path.display(),
                records = result.total_records(),
                "wrote TOML"
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

#[cfg(feature = "arrow")]
fn write_arrow(result: &DecodeResult<'_>, dir: &Path) -> Result<()> {
    use gridyn_io::arrow_export::{records_to_batch, write_ipc_stream};

    fs::create_dir_all(dir).with_context(|| format!("creating '{}'", dir.display()))?;
    for (name, records) in &result.models {
        let batch = records_to_batch(records)?;
        let path = dir.join(format!("{name}.arrow"));
        fs::write(&path, write_ipc_stream(&batch)?)
            .with_context(|| format!("writing '{}'", path.display()))?;
        info!(path = %path.display(), rows = batch.num_rows(), "wrote Arrow stream");
    }
    Ok(())
}

#[cfg(not(feature = "arrow"))]
fn write_arrow(_result: &DecodeResult<'_>, _dir: &Path) -> Result<()> {
    anyhow::bail!("gridyn was built without the `arrow` feature")
}
