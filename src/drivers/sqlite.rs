use crate::database_schema::SchemaSource;
use crate::error::{GeneratorError, Result};
use crate::types::sql_type;
use crate::types::ColumnMeta;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

const TABLES_QUERY: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY name";

const TABLE_INFO_QUERY: &str = "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid";

/// SQLite has a single schema per connection, so the schema argument is ignored.
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SchemaSource for SqliteSource {
    async fn tables(&self, _schema: Option<&str>) -> Result<Vec<String>> {
        let rows = sqlx::query(TABLES_QUERY).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(GeneratorError::from))
            .collect()
    }

    async fn primary_keys(&self, _schema: Option<&str>, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(TABLE_INFO_QUERY)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GeneratorError::metadata(table, e))?;

        let mut keys = rows
            .iter()
            .map(|row| -> std::result::Result<(i64, String), sqlx::Error> {
                Ok((row.try_get("pk")?, row.try_get("name")?))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GeneratorError::metadata(table, e))?;

        keys.retain(|(position, _)| *position > 0);
        keys.sort_by_key(|(position, _)| *position);

        Ok(keys.into_iter().map(|(_, name)| name).collect())
    }

    async fn columns(&self, _schema: Option<&str>, table: &str) -> Result<Vec<ColumnMeta>> {
        let rows = sqlx::query(TABLE_INFO_QUERY)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GeneratorError::metadata(table, e))?;

        rows.iter()
            .map(|row| -> std::result::Result<ColumnMeta, sqlx::Error> {
                let name: String = row.try_get("name")?;
                let declared: String = row.try_get("type")?;
                Ok(column_meta(name, &declared))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GeneratorError::metadata(table, e))
    }
}

/// Splits a declared type such as `DECIMAL(10, 2)` into its base name and
/// JDBC code, precision and scale.
pub fn column_meta(column_name: String, declared_type: &str) -> ColumnMeta {
    let declared_type = declared_type.trim();
    let (base, args) = match declared_type.find('(') {
        Some(open) => (
            declared_type[..open].trim(),
            declared_type[open + 1..].trim_end_matches(')'),
        ),
        None => (declared_type, ""),
    };

    let mut numbers = args.split(',').map(|n| n.trim().parse::<i32>().unwrap_or(0));
    let precision = numbers.next().unwrap_or(0);
    let scale = numbers.next().unwrap_or(0);

    ColumnMeta {
        column_name,
        sql_type: declared_type_code(base),
        type_name: base.to_string(),
        precision,
        scale,
    }
}

fn declared_type_code(base: &str) -> i32 {
    let upper = base.to_uppercase();

    match upper.as_str() {
        "" => sql_type::NULL,
        "INT" | "INTEGER" | "MEDIUMINT" | "INT2" | "INT4" => sql_type::INTEGER,
        "SMALLINT" => sql_type::SMALLINT,
        "TINYINT" => sql_type::TINYINT,
        "BIGINT" | "INT8" | "UNSIGNED BIG INT" => sql_type::BIGINT,
        "DECIMAL" => sql_type::DECIMAL,
        "NUMERIC" | "NUMBER" => sql_type::NUMERIC,
        "FLOAT" => sql_type::FLOAT,
        "REAL" => sql_type::REAL,
        "DOUBLE" | "DOUBLE PRECISION" => sql_type::DOUBLE,
        "CHAR" | "CHARACTER" => sql_type::CHAR,
        "NCHAR" | "NATIVE CHARACTER" => sql_type::NCHAR,
        "VARCHAR" | "VARYING CHARACTER" | "TEXT" => sql_type::VARCHAR,
        "NVARCHAR" => sql_type::NVARCHAR,
        "CLOB" => sql_type::CLOB,
        "BOOLEAN" | "BOOL" => sql_type::BOOLEAN,
        "BIT" => sql_type::BIT,
        "DATE" => sql_type::DATE,
        "TIME" => sql_type::TIME,
        "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" => sql_type::TIMESTAMP,
        "TIMESTAMP WITH TIME ZONE" => sql_type::TIMESTAMP_WITH_TIMEZONE,
        "BLOB" => sql_type::BLOB,
        "BINARY" => sql_type::BINARY,
        "VARBINARY" => sql_type::VARBINARY,
        _ if upper.contains("INT") => sql_type::INTEGER,
        _ if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") => {
            sql_type::VARCHAR
        }
        _ if upper.contains("BLOB") => sql_type::BLOB,
        _ if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") => {
            sql_type::DOUBLE
        }
        _ => sql_type::OTHER,
    }
}
