//! Error types for kickstart-core

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using kickstart-core's Error type
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad category of an [`Error`], used by callers to decide presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad flag value or flag combination; nothing was written
    Configuration,
    /// The command was run somewhere it cannot work (e.g. `add` outside a project)
    Precondition,
    /// The resolved template combination has no directory on disk
    TemplateMissing,
    /// A single file could not be merged
    Merge,
    /// Any other filesystem failure
    Io,
    /// The interactive prompt was aborted or failed
    Prompt,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value '{value}' for --{flag}. Allowed values: {allowed}")]
    InvalidOption {
        flag: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Unknown feature '{0}'. Available features: db, auth")]
    UnknownFeature(String),

    #[error("Invalid project name '{0}': use \".\" or a single directory name")]
    InvalidProjectName(String),

    #[error("--structured needs a src folder, but --src=false was given")]
    ConflictingLayout,

    #[error("--db-type and --orm must be given together (missing --{missing})")]
    IncompleteDatabaseFlags { missing: &'static str },

    #[error("{orm} cannot be used with {db}. Valid choices for {db}: {allowed}")]
    UnsupportedOrm {
        db: String,
        orm: String,
        allowed: String,
    },

    #[error("Missing --{0} (required in non-interactive mode)")]
    MissingOption(&'static str),

    #[error("components.json not found in {}", .0.display())]
    NotAProject(PathBuf),

    #[error("No template directory found. Pass --template-dir or set KICKSTART_EXPRESS_TEMPLATES")]
    TemplatesNotFound,

    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Destination {} already exists and is not empty", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("Malformed JSON in {}: {source}", .path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected structure in {}: {reason}", .path.display())]
    UnexpectedJson { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

impl Error {
    /// Which class of failure this is
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOption { .. }
            | Error::UnknownFeature(_)
            | Error::InvalidProjectName(_)
            | Error::ConflictingLayout
            | Error::IncompleteDatabaseFlags { .. }
            | Error::UnsupportedOrm { .. }
            | Error::MissingOption(_) => ErrorKind::Configuration,
            Error::NotAProject(_) | Error::DestinationNotEmpty(_) => ErrorKind::Precondition,
            Error::TemplatesNotFound | Error::TemplateMissing(_) => ErrorKind::TemplateMissing,
            Error::MalformedJson { .. } | Error::UnexpectedJson { .. } => ErrorKind::Merge,
            Error::Io { .. } => ErrorKind::Io,
            Error::Prompt(_) => ErrorKind::Prompt,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::io(format!("Failed to read {}", path.display()), source)
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::io(format!("Failed to write {}", path.display()), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_classified() {
        let err = Error::IncompleteDatabaseFlags { missing: "orm" };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("--orm"));
    }

    #[test]
    fn test_not_a_project_is_precondition() {
        let err = Error::NotAProject(PathBuf::from("/tmp/x"));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.to_string().contains("components.json"));
    }
}
