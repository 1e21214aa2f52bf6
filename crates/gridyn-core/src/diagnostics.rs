//! Validation issues recorded while decoding.
//!
//! Decoding never aborts on bad field data. Every problem with one field of
//! one record becomes a [`ValidationIssue`] appended in input order, and the
//! caller decides afterwards whether any of them matter.
//!
//! # Example
//!
//! ```
//! use gridyn_core::diagnostics::{IssueKind, Severity, ValidationIssue};
//!
//! let issue = ValidationIssue::new("GENROU", 1, "H", IssueKind::OutOfRange, "H below 0.0")
//!     .with_offending_value("-5.0");
//!
//! assert_eq!(issue.severity(), Severity::Warning);
//! assert_eq!(issue.to_string(), "[warning:out_of_range] GENROU#1.H: H below 0.0 (value: -5.0)");
//! ```

use std::fmt;

use serde::Serialize;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Value kept or defaulted (e.g., out of range, required field defaulted)
    Warning,
    /// Source value unusable or absent; the cell holds the field default or is missing
    Error,
}

/// What went wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    OutOfRange,
    ParseError,
    MissingRequiredNoDefault,
    MissingRequiredWithDefault,
}

impl IssueKind {
    pub const ALL: [IssueKind; 4] = [
        IssueKind::OutOfRange,
        IssueKind::ParseError,
        IssueKind::MissingRequiredNoDefault,
        IssueKind::MissingRequiredWithDefault,
    ];

    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::OutOfRange | IssueKind::MissingRequiredWithDefault => Severity::Warning,
            IssueKind::ParseError | IssueKind::MissingRequiredNoDefault => Severity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::OutOfRange => "out_of_range",
            IssueKind::ParseError => "parse_error",
            IssueKind::MissingRequiredNoDefault => "missing_required_no_default",
            IssueKind::MissingRequiredWithDefault => "missing_required_with_default",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single non-fatal problem with one field of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub model_name: String,
    /// 1-based index within the model's record sequence
    pub record_index: usize,
    pub field_name: String,
    pub kind: IssueKind,
    pub message: String,
    /// Raw or parsed value that triggered the issue, in text form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending_value: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        model_name: impl Into<String>,
        record_index: usize,
        field_name: impl Into<String>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            record_index,
            field_name: field_name.into(),
            kind,
            message: message.into(),
            offending_value: None,
        }
    }

    pub fn with_offending_value(mut self, value: impl Into<String>) -> Self {
        self.offending_value = Some(value.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity() {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "[{}:{}] {}#{}.{}: {}",
            severity, self.kind, self.model_name, self.record_index, self.field_name, self.message
        )?;
        if let Some(value) = &self.offending_value {
            write!(f, " (value: {})", value)?;
        }
        Ok(())
    }
}

/// Issue counts per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub out_of_range: usize,
    pub parse_error: usize,
    pub missing_required_no_default: usize,
    pub missing_required_with_default: usize,
}

impl IssueSummary {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a ValidationIssue>) -> Self {
        let mut summary = Self::default();
        for issue in issues {
            *summary.count_mut(issue.kind) += 1;
        }
        summary
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        match kind {
            IssueKind::OutOfRange => self.out_of_range,
            IssueKind::ParseError => self.parse_error,
            IssueKind::MissingRequiredNoDefault => self.missing_required_no_default,
            IssueKind::MissingRequiredWithDefault => self.missing_required_with_default,
        }
    }

    fn count_mut(&mut self, kind: IssueKind) -> &mut usize {
        match kind {
            IssueKind::OutOfRange => &mut self.out_of_range,
            IssueKind::ParseError => &mut self.parse_error,
            IssueKind::MissingRequiredNoDefault => &mut self.missing_required_no_default,
            IssueKind::MissingRequiredWithDefault => &mut self.missing_required_with_default,
        }
    }

    pub fn total(&self) -> usize {
        IssueKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    pub fn error_count(&self) -> usize {
        IssueKind::ALL
            .iter()
            .filter(|k| k.severity() == Severity::Error)
            .map(|k| self.count(*k))
            .sum()
    }
}

impl fmt::Display for IssueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in IssueKind::ALL {
            let count = self.count(kind);
            if count > 0 {
                writeln!(f, "{}: {}", kind, count)?;
            }
        }
        Ok(())
    }
}
