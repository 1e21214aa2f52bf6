//! Source format detection and dispatch.

use std::fmt;
use std::path::Path;

use gridyn_core::{GridynResult, SchemaRegistry};
use tracing::debug;

use crate::dyr::decode_dyr_str;
use crate::helpers::{read_source, DecodeOptions};
use crate::result::DecodeResult;
use crate::structured::decode_toml_str;

/// Supported dynamics data formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// PSS/E DYR positional text
    Dyr,
    /// TOML arrays of tables keyed by model name
    Toml,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Dyr, Format::Toml];

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Dyr => "dyr",
            Format::Toml => "toml",
        }
    }

    /// Format implied by the file extension, if any.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        Format::ALL
            .into_iter()
            .find(|f| ext.eq_ignore_ascii_case(f.extension()))
    }

    /// Guess the format from content: anything that parses as a TOML
    /// document is TOML, the rest is DYR.
    pub fn sniff(text: &str) -> Format {
        if text.parse::<toml::Table>().is_ok() {
            Format::Toml
        } else {
            Format::Dyr
        }
    }

    /// Extension first, content sniffing as the fallback.
    pub fn detect(path: &Path, text: &str) -> Format {
        Format::from_path(path).unwrap_or_else(|| {
            let sniffed = Format::sniff(text);
            debug!(path = %path.display(), format = %sniffed, "sniffed source format");
            sniffed
        })
    }

    /// Decode in-memory text in this format.
    pub fn decode_str<'r>(
        &self,
        text: &str,
        source: &str,
        registry: Option<&'r SchemaRegistry>,
    ) -> GridynResult<DecodeResult<'r>> {
        match self {
            Format::Dyr => Ok(decode_dyr_str(text, source, registry)),
            Format::Toml => decode_toml_str(text, source, registry),
        }
    }

    /// Read `path` through the size guard, detect its format and decode it.
    pub fn decode<'r>(
        path: &Path,
        registry: Option<&'r SchemaRegistry>,
        options: &DecodeOptions,
    ) -> GridynResult<DecodeResult<'r>> {
        let text = read_source(path, options)?;
        Format::detect(path, &text).decode_str(&text, &path.display().to_string(), registry)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Dyr => "DYR",
            Format::Toml => "TOML",
        })
    }
}
