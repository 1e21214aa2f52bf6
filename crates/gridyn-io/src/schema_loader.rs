//! YAML model schema loading.
//!
//! One file describes one model:
//!
//! ```yaml
//! name: GENROU
//! category: generator
//! multi_line: true
//! line_count: 2
//! fields:
//!   - name: BUS
//!     position: 1
//!     type: int
//!     required: true
//!   - name: H
//!     position: 8
//!     type: float
//!     default: 3.0
//!     range: [0.0, .inf]
//! ```
//!
//! [`load_registry`] walks a directory tree for `.yaml`/`.yml` files. A file
//! that fails to parse or validate is logged and skipped so one bad schema
//! does not hide the rest.

use std::path::Path;

use gridyn_core::{
    FieldRange, FieldSchema, FieldType, GridynError, GridynResult, ModelSchema, RawValue,
    SchemaRegistry, DEFAULT_MODEL_NAME_FIELD, DEFAULT_TERMINATOR,
};
use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::coerce::coerce_dynamic;
use crate::helpers::SourceGuard;

const SCHEMA_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, Deserialize)]
struct RawModelSchema {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default = "default_model_name_field")]
    model_name_field: usize,
    #[serde(default)]
    multi_line: bool,
    #[serde(default)]
    line_count: Option<usize>,
    #[serde(default)]
    terminator: Option<String>,
    #[serde(default)]
    fields: Vec<RawFieldSchema>,
}

fn default_model_name_field() -> usize {
    DEFAULT_MODEL_NAME_FIELD
}

#[derive(Debug, Deserialize)]
struct RawFieldSchema {
    name: String,
    position: usize,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Option<serde_yaml::Value>,
    #[serde(default)]
    range: Option<Vec<Option<RawBound>>>,
}

/// One side of a range: a number (YAML `.inf` included) or an infinity
/// spelled as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(f64),
    Text(String),
}

impl RawBound {
    fn resolve(&self, unbounded: f64) -> GridynResult<f64> {
        match self {
            RawBound::Number(n) => Ok(*n),
            RawBound::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" | ".inf" => Ok(f64::INFINITY),
                "-inf" | "-infinity" | "-.inf" => Ok(f64::NEG_INFINITY),
                "" => Ok(unbounded),
                other => other
                    .parse()
                    .map_err(|_| GridynError::Schema(format!("invalid range bound '{}'", s))),
            },
        }
    }
}

impl RawFieldSchema {
    fn build(self) -> GridynResult<FieldSchema> {
        let field_type: FieldType = self.field_type.parse()?;
        let mut field = FieldSchema::new(self.name, self.position, field_type)
            .with_description(self.description.unwrap_or_default())
            .with_unit(self.unit.unwrap_or_default())
            .required(self.required);

        if let Some(default) = self.default.filter(|v| !v.is_null()) {
            let raw = raw_from_yaml(&default).ok_or_else(|| {
                GridynError::Schema(format!(
                    "default for field '{}' must be a scalar",
                    field.name()
                ))
            })?;
            let value = coerce_dynamic(field_type, &raw).map_err(|e| {
                GridynError::Schema(format!("default for field '{}': {}", field.name(), e))
            })?;
            field = field.with_default(value)?;
        }

        if let Some(bounds) = self.range {
            let [min, max] = <[Option<RawBound>; 2]>::try_from(bounds).map_err(|b| {
                GridynError::Schema(format!(
                    "range for field '{}' needs 2 bounds, got {}",
                    field.name(),
                    b.len()
                ))
            })?;
            let min = min.map_or(Ok(f64::NEG_INFINITY), |b| b.resolve(f64::NEG_INFINITY))?;
            let max = max.map_or(Ok(f64::INFINITY), |b| b.resolve(f64::INFINITY))?;
            field = field.with_range(FieldRange::new(min, max)?)?;
        }

        Ok(field)
    }
}

impl RawModelSchema {
    fn build(self) -> GridynResult<ModelSchema> {
        let line_count = match (self.multi_line, self.line_count) {
            (true, Some(0)) => {
                return Err(GridynError::Schema(format!(
                    "model '{}' has line_count 0",
                    self.name
                )))
            }
            (true, Some(n)) => Some(n),
            (true, None) => {
                return Err(GridynError::Schema(format!(
                    "multi-line model '{}' must declare line_count",
                    self.name
                )))
            }
            (false, Some(_)) => {
                return Err(GridynError::Schema(format!(
                    "model '{}' declares line_count but is not multi_line",
                    self.name
                )))
            }
            (false, None) => None,
        };

        let fields = self
            .fields
            .into_iter()
            .map(RawFieldSchema::build)
            .collect::<GridynResult<Vec<_>>>()
            .map_err(|e| match e {
                GridynError::Schema(msg) => {
                    GridynError::Schema(format!("model '{}': {}", self.name, msg))
                }
                other => other,
            })?;

        let mut model = ModelSchema::new(self.name, fields)?
            .with_description(self.description.unwrap_or_default())
            .with_category(self.category.unwrap_or_default())
            .with_model_name_field(self.model_name_field)
            .with_terminator(
                self.terminator
                    .unwrap_or_else(|| DEFAULT_TERMINATOR.to_string()),
            );
        if let Some(n) = line_count {
            model = model.with_line_count(n);
        }
        Ok(model)
    }
}

/// Scalars and sequences only; mappings and tagged values have no
/// [`RawValue`] form.
fn raw_from_yaml(value: &serde_yaml::Value) -> Option<RawValue> {
    match value {
        serde_yaml::Value::Bool(b) => Some(RawValue::Boolean(*b)),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(RawValue::Integer(i)),
            None => n.as_f64().map(RawValue::Float),
        },
        serde_yaml::Value::String(s) => Some(RawValue::Text(s.clone())),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(raw_from_yaml)
            .collect::<Option<Vec<_>>>()
            .map(RawValue::List),
        serde_yaml::Value::Null
        | serde_yaml::Value::Mapping(_)
        | serde_yaml::Value::Tagged(_) => None,
    }
}

/// Parse one model schema from YAML text.
pub fn parse_model_schema(text: &str) -> GridynResult<ModelSchema> {
    let raw: RawModelSchema =
        serde_yaml::from_str(text).map_err(|e| GridynError::Schema(e.to_string()))?;
    raw.build()
}

/// Load one model schema file.
pub fn load_model_schema(path: &Path) -> GridynResult<ModelSchema> {
    let checked = SourceGuard::new()
        .with_extensions(SCHEMA_EXTENSIONS)
        .check(path)?;
    let text = checked.read_text()?;
    parse_model_schema(&text).map_err(|e| match e {
        GridynError::Schema(msg) => GridynError::Schema(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

fn is_schema_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SCHEMA_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Load every schema file under `dir` into a registry.
///
/// Files are visited in file-name order, so when two files define the same
/// model the one sorting last wins. Fails only when `dir` itself cannot be
/// read.
pub fn load_registry(dir: &Path) -> GridynResult<SchemaRegistry> {
    let checked = SourceGuard::new().directories(true).check(dir)?;
    if !checked.is_directory() {
        return Err(GridynError::Schema(format!(
            "schema path '{}' is not a directory",
            dir.display()
        )));
    }

    let mut models = Vec::new();
    for entry in WalkDir::new(checked.path()).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable schema directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_schema_file(entry.path()) {
            continue;
        }
        match load_model_schema(entry.path()) {
            Ok(model) => {
                debug!(model = model.name(), path = %entry.path().display(), "loaded schema");
                models.push(model);
            }
            Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping invalid schema file"),
        }
    }

    let registry = SchemaRegistry::from_models(models);
    info!(dir = %dir.display(), models = registry.len(), "loaded schema registry");
    Ok(registry)
}
