use std::path::PathBuf;

pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every fatal condition of a generation run. Unmapped column types are not
/// errors: they degrade to `java.lang.Object` with a warning.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("configuration error ({}): {message}", .path.display())]
    Configuration {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("invalid table filter pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    #[error("failed to read schema metadata{}", .table.as_ref().map(|t| format!(" for table `{t}`")).unwrap_or_default())]
    Metadata {
        table: Option<String>,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to render `{name}`")]
    Render {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub fn configuration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        GeneratorError::Configuration {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration_caused(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        GeneratorError::Configuration {
            path: path.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn metadata(table: &str, source: sqlx::Error) -> Self {
        GeneratorError::Metadata {
            table: Some(table.to_string()),
            source,
        }
    }
}

impl From<sqlx::Error> for GeneratorError {
    fn from(source: sqlx::Error) -> Self {
        GeneratorError::Metadata {
            table: None,
            source,
        }
    }
}
