//! # gridyn-io: Dynamics Data Decoding
//!
//! Schema-driven decoding of power-system dynamics data into column-oriented
//! typed records, for the PSS/E DYR positional text format and an equivalent
//! TOML format.
//!
//! ## Design Philosophy
//!
//! **One Algorithm**: Both formats feed the same [`decoder::decode_model`]
//! through the [`decoder::RecordFormat`] trait. A format only supplies field
//! extraction and value coercion.
//!
//! **Error Recovery**: Field-level problems (unparseable values, out-of-range
//! values, missing required fields) never abort a decode. They are collected
//! as [`gridyn_core::ValidationIssue`]s beside the decoded data.
//!
//! **Schema Optional**: Models without a schema are still kept, as indexed
//! rows of raw values.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use gridyn_io::{load_registry, DecodeOptions, Format};
//!
//! fn main() -> gridyn_core::GridynResult<()> {
//!     let registry = load_registry(Path::new("schemas"))?;
//!     let result = Format::decode(
//!         Path::new("case39.dyr"),
//!         Some(&registry),
//!         &DecodeOptions::default(),
//!     )?;
//!
//!     for name in result.model_names() {
//!         println!("{}: {} records", name, result.model(name).map_or(0, |m| m.len()));
//!     }
//!     if result.has_issues() {
//!         eprintln!("{}", result.issue_summary());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Extension | Notes |
//! |--------|-----------|-------|
//! | PSS/E DYR | `.dyr` | `/`-terminated records, multi-line models |
//! | TOML | `.toml` | arrays of tables keyed by model name |
//!
//! Other extensions (`.txt`) are sniffed from content.
//!
//! ## Module Overview
//!
//! - [`coerce`] - text and dynamic value coercion
//! - [`decoder`] - the generic per-model decoder
//! - [`dyr`] - DYR framing and positional extraction
//! - [`structured`] - TOML framing and keyed extraction
//! - [`result`] - per-model aggregation into a [`DecodeResult`]
//! - [`reencode`] - render a result back to TOML
//! - [`schema_loader`] - YAML model schemas
//! - [`format`] - format detection and dispatch
//! - [`helpers`] - path validation and size limits
//! - `arrow_export` - Arrow record batches (feature `arrow`)

pub mod coerce;
pub mod decoder;
pub mod dyr;
pub mod format;
pub mod helpers;
pub mod reencode;
pub mod result;
pub mod schema_loader;
pub mod structured;

#[cfg(feature = "arrow")]
pub mod arrow_export;

pub use dyr::{decode_dyr, decode_dyr_str, DyrFormat};
pub use format::Format;
pub use helpers::DecodeOptions;
pub use reencode::reencode;
pub use result::{DecodeResult, DecodedRecords};
pub use schema_loader::{load_model_schema, load_registry, parse_model_schema};
pub use structured::{decode_toml, decode_toml_str, TomlFormat};
