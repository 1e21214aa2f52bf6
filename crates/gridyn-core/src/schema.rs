//! Declarative model schemas.
//!
//! A [`ModelSchema`] describes one device model (e.g. `GENROU`): how its legacy
//! records are framed and the ordered list of [`FieldSchema`] parameters.
//! Schemas are built once, validated at construction, and held read-only in a
//! [`SchemaRegistry`] for the rest of a decode session.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{GridynError, GridynResult};
use crate::value::Value;

/// Default 1-based position of the quoted model name in a legacy record.
pub const DEFAULT_MODEL_NAME_FIELD: usize = 2;

/// Default legacy record terminator.
pub const DEFAULT_TERMINATOR: &str = "/";

/// Primitive type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl FieldType {
    /// Integer and Float fields accept a validation range.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = GridynError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(FieldType::Integer),
            "float" => Ok(FieldType::Float),
            "str" | "string" | "text" => Ok(FieldType::Text),
            "bool" | "boolean" => Ok(FieldType::Boolean),
            other => Err(GridynError::Schema(format!("unknown field type '{}'", other))),
        }
    }
}

/// Inclusive numeric bounds. An unbounded side is an infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn new(min: f64, max: f64) -> GridynResult<Self> {
        if min.is_nan() || max.is_nan() {
            return Err(GridynError::Schema("range bounds cannot be NaN".into()));
        }
        if min > max {
            return Err(GridynError::Schema(format!(
                "range lower bound {} exceeds upper bound {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Range with only a lower bound.
    pub fn at_least(min: f64) -> GridynResult<Self> {
        Self::new(min, f64::INFINITY)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for FieldRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// One parameter definition within a model schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    name: String,
    position: usize,
    #[serde(rename = "type")]
    field_type: FieldType,
    description: String,
    unit: String,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<FieldRange>,
}

impl FieldSchema {
    /// Create an optional field with no default, range, description or unit.
    pub fn new(name: impl Into<String>, position: usize, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            position,
            field_type,
            description: String::new(),
            unit: String::new(),
            required: false,
            default: None,
            range: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attach a default value. Integer defaults widen to Float fields; any
    /// other type mismatch is rejected.
    pub fn with_default(mut self, default: Value) -> GridynResult<Self> {
        let default = match (self.field_type, default) {
            (FieldType::Float, Value::Integer(i)) => Value::Float(i as f64),
            (expected, value) if value.field_type() == expected => value,
            (expected, value) => {
                return Err(GridynError::Schema(format!(
                    "default {} for field '{}' is not of type {}",
                    value, self.name, expected
                )))
            }
        };
        self.default = Some(default);
        Ok(self)
    }

    /// Attach a validation range. Only numeric fields accept one.
    pub fn with_range(mut self, range: FieldRange) -> GridynResult<Self> {
        if !self.field_type.is_numeric() {
            return Err(GridynError::Schema(format!(
                "field '{}' of type {} cannot carry a range",
                self.name, self.field_type
            )));
        }
        self.range = Some(range);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn range(&self) -> Option<&FieldRange> {
        self.range.as_ref()
    }
}

/// One device model definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSchema {
    name: String,
    description: String,
    category: String,
    model_name_field: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_count: Option<usize>,
    terminator: String,
    fields: Vec<FieldSchema>,
}

impl ModelSchema {
    /// Build a schema from its ordered fields.
    ///
    /// Field names and positions must both be unique.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> GridynResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GridynError::Schema("model name cannot be empty".into()));
        }

        let mut names = HashSet::new();
        let mut positions = HashSet::new();
        for field in &fields {
            if !names.insert(field.name()) {
                return Err(GridynError::Schema(format!(
                    "model '{}' declares field '{}' more than once",
                    name,
                    field.name()
                )));
            }
            if field.position() == 0 {
                return Err(GridynError::Schema(format!(
                    "field '{}' of model '{}' has position 0; positions are 1-based",
                    field.name(),
                    name
                )));
            }
            if !positions.insert(field.position()) {
                return Err(GridynError::Schema(format!(
                    "model '{}' reuses position {} (field '{}')",
                    name,
                    field.position(),
                    field.name()
                )));
            }
        }

        Ok(Self {
            name,
            description: String::new(),
            category: String::new(),
            model_name_field: DEFAULT_MODEL_NAME_FIELD,
            line_count: None,
            terminator: DEFAULT_TERMINATOR.to_string(),
            fields,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_model_name_field(mut self, position: usize) -> Self {
        self.model_name_field = position;
        self
    }

    /// Mark the model as spanning `line_count` physical lines.
    pub fn with_line_count(mut self, line_count: usize) -> Self {
        self.line_count = Some(line_count);
        self
    }

    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn model_name_field(&self) -> usize {
        self.model_name_field
    }

    pub fn is_multi_line(&self) -> bool {
        self.line_count.is_some()
    }

    pub fn line_count(&self) -> Option<usize> {
        self.line_count
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSchema::name)
    }
}

/// Read-only lookup of model schemas by name, with a derived category index.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: BTreeMap<String, ModelSchema>,
    categories: BTreeMap<String, Vec<String>>,
}

impl SchemaRegistry {
    /// Build a registry. When two schemas share a name the later one wins.
    pub fn from_models(models: impl IntoIterator<Item = ModelSchema>) -> Self {
        let mut by_name = BTreeMap::new();
        for model in models {
            if let Some(previous) = by_name.insert(model.name().to_string(), model) {
                tracing::warn!(
                    model = previous.name(),
                    "duplicate schema definition; keeping the last one loaded"
                );
            }
        }

        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for model in by_name.values() {
            categories
                .entry(model.category().to_string())
                .or_default()
                .push(model.name().to_string());
        }

        Self {
            models: by_name,
            categories,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.values()
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn models_in_category(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
