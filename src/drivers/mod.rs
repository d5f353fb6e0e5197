//! `SchemaSource` implementations backed by sqlx pools.

pub mod postgres;
pub mod sqlite;

pub use postgres::PostgresSource;
pub use sqlite::SqliteSource;

use crate::config::ConnectionSettings;
use crate::database_schema::SchemaSource;
use crate::error::{GeneratorError, Result};
use tracing::info;

/// Opens the driver matching the URL scheme. A leading `jdbc:` is ignored.
pub async fn connect(settings: &ConnectionSettings) -> Result<Box<dyn SchemaSource>> {
    let url = settings.url.strip_prefix("jdbc:").unwrap_or(&settings.url);

    if url.starts_with("sqlite:") {
        info!("Connecting to SQLite database");
        Ok(Box::new(SqliteSource::connect(url).await?))
    } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
        info!("Connecting to PostgreSQL database");
        Ok(Box::new(
            PostgresSource::connect(url, settings.user.as_deref(), settings.password.as_deref()).await?,
        ))
    } else {
        Err(GeneratorError::configuration(
            "jdbc.url",
            format!("unsupported database url `{}`", settings.url),
        ))
    }
}
