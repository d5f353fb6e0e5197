//! PostgreSQL metadata read from `information_schema`.
//!
//! Without a `jdbc.schema` every query spans all user schemas (everything but
//! `pg_catalog` and `information_schema`), the same as a JDBC metadata call
//! with a `null` schema pattern.

use crate::database_schema::SchemaSource;
use crate::error::{GeneratorError, Result};
use crate::types::sql_type;
use crate::types::ColumnMeta;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Row;
use std::str::FromStr;

const TABLES_QUERY: &str = "SELECT table_name::text AS table_name \
     FROM information_schema.tables \
     WHERE ($1::text IS NULL OR table_schema = $1) \
       AND table_schema NOT IN ('pg_catalog', 'information_schema') \
       AND table_type = 'BASE TABLE' \
     ORDER BY table_schema, table_name";

const PRIMARY_KEYS_QUERY: &str = "SELECT kcu.column_name::text AS column_name \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name \
      AND tc.table_schema = kcu.table_schema \
      AND tc.table_name = kcu.table_name \
     WHERE tc.constraint_type = 'PRIMARY KEY' \
       AND ($1::text IS NULL OR tc.table_schema = $1) \
       AND tc.table_schema NOT IN ('pg_catalog', 'information_schema') \
       AND tc.table_name = $2 \
     ORDER BY tc.table_schema, kcu.ordinal_position";

const COLUMNS_QUERY: &str = "SELECT column_name::text AS column_name, \
            udt_name::text AS udt_name, \
            data_type::text AS data_type, \
            COALESCE(numeric_precision, character_maximum_length, datetime_precision, 0)::int4 AS precision, \
            COALESCE(numeric_scale, 0)::int4 AS scale \
     FROM information_schema.columns \
     WHERE ($1::text IS NULL OR table_schema = $1) \
       AND table_schema NOT IN ('pg_catalog', 'information_schema') \
       AND table_name = $2 \
     ORDER BY table_schema, ordinal_position";

pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, user: Option<&str>, password: Option<&str>) -> Result<Self> {
        let mut options = PgConnectOptions::from_str(url)?;
        if let Some(user) = user.filter(|u| !u.is_empty()) {
            options = options.username(user);
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SchemaSource for PostgresSource {
    async fn tables(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let rows = sqlx::query(TABLES_QUERY)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("table_name").map_err(GeneratorError::from))
            .collect()
    }

    async fn primary_keys(&self, schema: Option<&str>, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(PRIMARY_KEYS_QUERY)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GeneratorError::metadata(table, e))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("column_name"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GeneratorError::metadata(table, e))
    }

    async fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMeta>> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GeneratorError::metadata(table, e))?;

        rows.iter()
            .map(|row| -> std::result::Result<ColumnMeta, sqlx::Error> {
                let udt_name: String = row.try_get("udt_name")?;
                let data_type: String = row.try_get("data_type")?;

                Ok(ColumnMeta {
                    column_name: row.try_get("column_name")?,
                    sql_type: udt_type_code(&udt_name, &data_type),
                    type_name: udt_name,
                    precision: row.try_get("precision")?,
                    scale: row.try_get("scale")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GeneratorError::metadata(table, e))
    }
}

/// JDBC code the PostgreSQL JDBC driver reports for a column type.
pub fn udt_type_code(udt_name: &str, data_type: &str) -> i32 {
    if data_type.eq_ignore_ascii_case("ARRAY") || udt_name.starts_with('_') {
        return sql_type::ARRAY;
    }

    match udt_name {
        "int2" => sql_type::SMALLINT,
        "int4" | "serial" | "oid" => sql_type::INTEGER,
        "int8" | "bigserial" => sql_type::BIGINT,
        "numeric" => sql_type::NUMERIC,
        "float4" => sql_type::REAL,
        "float8" | "money" => sql_type::DOUBLE,
        "bpchar" | "char" => sql_type::CHAR,
        "varchar" | "text" | "name" => sql_type::VARCHAR,
        "bool" | "bit" => sql_type::BIT,
        "date" => sql_type::DATE,
        "time" | "timetz" => sql_type::TIME,
        "timestamp" | "timestamptz" => sql_type::TIMESTAMP,
        "bytea" => sql_type::BINARY,
        _ => sql_type::OTHER,
    }
}
