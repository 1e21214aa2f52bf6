//! # gridyn-core: Dynamics Data Model
//!
//! Shared types for decoding power-system dynamics records (PSS/E DYR and its
//! TOML equivalent):
//!
//! - [`schema`]: [`FieldSchema`], [`ModelSchema`] and the read-only
//!   [`SchemaRegistry`]
//! - [`value`]: typed [`Value`]s, structured-format [`RawValue`]s, and the
//!   [`Cell`] present/missing marker
//! - [`column`]: column-oriented [`ColumnStore`] produced by the decoder
//! - [`diagnostics`]: non-fatal [`ValidationIssue`]s
//! - [`error`]: the fatal [`GridynError`] paths
//!
//! ## Quick Start
//!
//! ```rust
//! use gridyn_core::*;
//!
//! let genrou = ModelSchema::new(
//!     "GENROU",
//!     vec![
//!         FieldSchema::new("BUS", 1, FieldType::Integer).required(true),
//!         FieldSchema::new("H", 8, FieldType::Float)
//!             .with_range(FieldRange::at_least(0.0)?)?,
//!     ],
//! )?
//! .with_category("generator")
//! .with_line_count(2);
//!
//! let registry = SchemaRegistry::from_models([genrou]);
//! assert!(registry.get("GENROU").is_some_and(|m| m.is_multi_line()));
//! # Ok::<(), GridynError>(())
//! ```

pub mod column;
pub mod diagnostics;
pub mod error;
pub mod schema;
pub mod value;

pub use column::{Column, ColumnStore};
pub use diagnostics::{IssueKind, IssueSummary, Severity, ValidationIssue};
pub use error::{ConversionError, GridynError, GridynResult};
pub use schema::{
    FieldRange, FieldSchema, FieldType, ModelSchema, SchemaRegistry, DEFAULT_MODEL_NAME_FIELD,
    DEFAULT_TERMINATOR,
};
pub use value::{Cell, RawValue, Value};
