use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a validation diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Classification of a diagnostic, mirroring the pipeline stage that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Parse,
    Shape,
    Reference,
    Expression,
    Constraint,
    Type,
    Layer,
    Theme,
}

/// A validation diagnostic. The validator accumulates these rather than
/// stopping at the first problem, so users fix many issues per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Dotted token path the diagnostic refers to.
    pub path: String,
    pub message: String,
    /// Source file recorded by the loader for `path`, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            path: path.into(),
            message: message.into(),
            file: None,
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            path: path.into(),
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: Option<&str>) -> Self {
        self.file = file.map(str::to_owned);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.file {
            Some(file) => write!(f, "{}: {}: {} ({})", sev, self.path, self.message, file),
            None => write!(f, "{}: {}: {}", sev, self.path, self.message),
        }
    }
}

/// Fail-fast error for the structural pipeline stages (loader, scale
/// expander, theme resolver, resolver internals). The validator converts
/// these into accumulated [`Diagnostic`]s where it can keep going.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("cannot read {file}: {message}")]
    Io { file: String, message: String },
    #[error("invalid JSON in {file}: {message}")]
    Json { file: String, message: String },
    #[error("invalid dimension '{input}': {message}")]
    Dimension { input: String, message: String },
    #[error("invalid color '{input}': {message}")]
    Color { input: String, message: String },
    #[error("reference to unknown token '{path}'")]
    MissingReference { path: String },
    #[error("circular dependency detected: {chain}")]
    CircularReference { chain: String },
    #[error("unrecognized expression '{expr}'")]
    UnknownExpression { expr: String },
    #[error("{path}: {message}")]
    Expression { path: String, message: String },
    #[error("{path}: invalid $scale: {message}")]
    Scale { path: String, message: String },
    #[error("{path}: invalid constraint: {message}")]
    Constraint { path: String, message: String },
    #[error("theme '{theme}': {message}")]
    Theme { theme: String, message: String },
}

impl BuildError {
    /// Map a fail-fast error onto the diagnostic taxonomy.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            BuildError::Io { .. } | BuildError::Json { .. } => DiagnosticKind::Parse,
            BuildError::Dimension { .. } | BuildError::Color { .. } => DiagnosticKind::Parse,
            BuildError::MissingReference { .. } | BuildError::CircularReference { .. } => {
                DiagnosticKind::Reference
            }
            BuildError::UnknownExpression { .. } | BuildError::Expression { .. } => {
                DiagnosticKind::Expression
            }
            BuildError::Scale { .. } => DiagnosticKind::Shape,
            BuildError::Constraint { .. } => DiagnosticKind::Constraint,
            BuildError::Theme { .. } => DiagnosticKind::Theme,
        }
    }
}
