//! Error types for skill document operations

use std::path::PathBuf;
use thiserror::Error;

/// Skill document errors
#[derive(Debug, Error)]
pub enum SkillError {
    /// The first line of the document is not a `---` delimiter
    #[error("document does not start with a front-matter delimiter line (---)")]
    MissingOpeningDelimiter,

    /// No closing `---` line after the opening delimiter
    #[error("front-matter block is never closed by a --- line")]
    UnterminatedFrontMatter,

    /// Front-matter is not valid YAML, or does not fit the expected keys
    #[error("invalid front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Front-matter parsed, but is not a key/value mapping
    #[error("front-matter must be a mapping of keys to values")]
    NotAMapping,

    /// A validation pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O failure on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// No registered skill with this name
    #[error("skill '{0}' not found")]
    NotFound(String),

    /// README lacks the generated-index markers
    #[error("README has no `{start}` / `{end}` markers for the skills index")]
    MissingIndexMarkers {
        /// Opening marker expected
        start: &'static str,
        /// Closing marker expected
        end: &'static str,
    },
}

impl SkillError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, SkillError>;
