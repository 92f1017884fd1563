use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[source] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// What is wrong with a single raw field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    WrongType { expected: &'static str },
    Negative,
    Empty,
    /// Value has the right type but violates a range or cross-field rule.
    OutOfRange(String),
    Duplicate,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => write!(f, "is required"),
            FieldProblem::WrongType { expected } => write!(f, "must be {expected}"),
            FieldProblem::Negative => write!(f, "must not be negative"),
            FieldProblem::Empty => write!(f, "must not be empty"),
            FieldProblem::OutOfRange(reason) => write!(f, "{reason}"),
            FieldProblem::Duplicate => write!(f, "is duplicated within the batch"),
        }
    }
}

/// A problem attached to a field path such as `my_price` or
/// `best_offers[2].merchant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: FieldProblem,
}

impl FieldIssue {
    #[must_use]
    pub fn new(field: impl Into<String>, problem: FieldProblem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// A raw mapping that could not become a [`crate::ProductRecord`].
///
/// Carries every offending field, not just the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {} failed validation: {}", sku_label(.sku.as_deref()), join_issues(.issues))]
pub struct ValidationError {
    /// The record's SKU when it was readable, for log correlation.
    pub sku: Option<String>,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Returns `true` if any issue is attached to `field`.
    #[must_use]
    pub fn has_issue_for(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn sku_label(sku: Option<&str>) -> &str {
    sku.unwrap_or("<unknown sku>")
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
