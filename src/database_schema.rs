use crate::column_mapping::TypeMapper;
use crate::error::Result;
use crate::mappings::GeneratorMappings;
use crate::types::{ColumnMeta, FieldMeta, TableMeta};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Read access to the schema of a live database.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Base tables of `schema`, in the order the database reports them.
    async fn tables(&self, schema: Option<&str>) -> Result<Vec<String>>;

    async fn primary_keys(&self, schema: Option<&str>, table: &str) -> Result<Vec<String>>;

    /// Columns of `table` in declaration order.
    async fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnMeta>>;
}

/// Builds one [`TableMeta`] per table from driver metadata, applying the
/// run's overrides and type mapping.
pub struct SchemaWalker<'a> {
    package_name: &'a str,
    mappings: &'a GeneratorMappings,
    type_mapper: TypeMapper,
}

impl<'a> SchemaWalker<'a> {
    pub fn new(package_name: &'a str, mappings: &'a GeneratorMappings, type_mapper: TypeMapper) -> Self {
        Self {
            package_name,
            mappings,
            type_mapper,
        }
    }

    pub fn should_process(&self, table_name: &str) -> bool {
        self.mappings.should_process_table(table_name)
    }

    pub async fn walk_table<S>(&self, source: &S, schema: Option<&str>, table_name: &str) -> Result<TableMeta>
    where
        S: SchemaSource + ?Sized,
    {
        let primary_keys = source.primary_keys(schema, table_name).await?;
        let columns = source.columns(schema, table_name).await?;

        Ok(self.table_meta(table_name, &primary_keys, &columns))
    }

    pub fn table_meta(&self, table_name: &str, primary_keys: &[String], columns: &[ColumnMeta]) -> TableMeta {
        let overrides = &self.mappings.overrides;
        let class_name = overrides.mapped_table_name(table_name);

        let pk_names: HashSet<String> = primary_keys.iter().map(|pk| pk.to_lowercase()).collect();

        let mut pk_columns = Vec::new();
        let mut regular_columns = Vec::new();
        let mut imports = BTreeSet::new();
        let mut unmapped_columns = Vec::new();

        for column in columns {
            let mapping = self.type_mapper.map_column(column);
            if mapping.requires_import() {
                imports.insert(mapping.qualified.to_string());
            }
            if mapping.fallback {
                unmapped_columns.push(column.column_name.clone());
            }

            let java_name = overrides.mapped_column_name(table_name, &column.column_name);
            debug!(
                "{}.{} -> {} {}",
                table_name, column.column_name, mapping.qualified, java_name.name
            );

            let field = FieldMeta {
                java_name: java_name.name,
                db_name: column.column_name.clone(),
                java_type: mapping.simple_name().to_string(),
                has_custom_mapping: java_name.custom,
            };

            if pk_names.contains(&column.column_name.to_lowercase()) {
                pk_columns.push(field);
            } else {
                regular_columns.push(field);
            }
        }

        TableMeta {
            package_name: self.package_name.to_string(),
            has_custom_table_mapping: table_name.to_lowercase() != class_name.to_lowercase(),
            class_name,
            db_table_name: table_name.to_string(),
            has_composite_pk: pk_columns.len() > 1,
            pk_columns,
            columns: regular_columns,
            imports,
            unmapped_columns,
        }
    }
}
