use crate::column_mapping::TypeMapper;
use crate::config::{ConnectionSettings, GeneratorConfig};
use crate::database_schema::{SchemaSource, SchemaWalker};
use crate::drivers;
use crate::error::{GeneratorError, Result};
use crate::mappings::GeneratorMappings;
use crate::types::TableMeta;
use handlebars::Handlebars;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TPL_TABLE_RECORD: &str = "table-record";
pub const HBS_EXTENSION: &str = "hbs";

const DEFAULT_TABLE_RECORD: &str = include_str!("../templates/table-record.hbs");

/// Renders [`TableMeta`] values through the `table-record` template.
pub struct RecordRenderer {
    handlebars: Handlebars<'static>,
}

impl RecordRenderer {
    /// Uses `<dir>/table-record.hbs` when a directory is given, the built-in
    /// template otherwise.
    pub fn load(templates_path: Option<&Path>) -> Result<Self> {
        match templates_path {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(GeneratorError::configuration(dir, "templates path does not exist"));
                }
                info!("Using template file from folder: {}", dir.display());

                let file = dir.join(format!("{TPL_TABLE_RECORD}.{HBS_EXTENSION}"));
                let source = fs::read_to_string(&file).map_err(|e| {
                    GeneratorError::configuration_caused(&file, "failed to read record template", e)
                })?;
                Self::from_source(&source)
            }
            None => {
                info!("No custom templates path specified. Falling back to default values.");
                Self::from_source(DEFAULT_TABLE_RECORD)
            }
        }
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(TPL_TABLE_RECORD, source)
            .map_err(|e| GeneratorError::Render {
                name: TPL_TABLE_RECORD.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self { handlebars })
    }

    pub fn render(&self, table_meta: &TableMeta) -> Result<String> {
        self.handlebars
            .render(TPL_TABLE_RECORD, table_meta)
            .map_err(|e| GeneratorError::Render {
                name: table_meta.class_name.clone(),
                source: Box::new(e),
            })
    }
}

/// Outcome of a successful run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub tables_seen: usize,
    pub skipped: Vec<String>,
    pub written: Vec<PathBuf>,
    pub unmapped_columns: usize,
}

pub struct RecordGenerator {
    config: GeneratorConfig,
    mappings: GeneratorMappings,
    renderer: RecordRenderer,
}

impl RecordGenerator {
    /// Loads mappings and the template so configuration problems surface
    /// before the database is touched.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mappings = GeneratorMappings::load(config.mappings_path.as_deref())?;
        let renderer = RecordRenderer::load(config.templates_path.as_deref())?;

        Ok(Self::with_parts(config, mappings, renderer))
    }

    pub fn with_parts(config: GeneratorConfig, mappings: GeneratorMappings, renderer: RecordRenderer) -> Self {
        Self {
            config,
            mappings,
            renderer,
        }
    }

    /// Reads the connection document, connects and generates every table.
    pub async fn run(&self) -> Result<GenerationSummary> {
        let settings = ConnectionSettings::load(&self.config.env_path)?;
        let source = drivers::connect(&settings).await?;

        self.generate_from(source.as_ref(), settings.schema.as_deref()).await
    }

    /// Generates one file per eligible table, stopping at the first failure.
    pub async fn generate_from<S>(&self, source: &S, schema: Option<&str>) -> Result<GenerationSummary>
    where
        S: SchemaSource + ?Sized,
    {
        let walker = SchemaWalker::new(
            &self.config.package_name,
            &self.mappings,
            TypeMapper::new(self.config.timestamp_tz),
        );
        let mut summary = GenerationSummary::default();

        for table_name in source.tables(schema).await? {
            summary.tables_seen += 1;

            if !walker.should_process(&table_name) {
                debug!("Skipping table {}", table_name);
                summary.skipped.push(table_name);
                continue;
            }

            let table_meta = walker.walk_table(source, schema, &table_name).await?;
            info!("Generating: {} -> {}", table_name, table_meta.class_name);

            summary.unmapped_columns += table_meta.unmapped_columns.len();
            summary.written.push(self.write_record(&table_meta)?);
        }

        Ok(summary)
    }

    pub fn write_record(&self, table_meta: &TableMeta) -> Result<PathBuf> {
        let content = self.renderer.render(table_meta)?;

        let dir = self.config.package_dir();
        fs::create_dir_all(&dir).map_err(|source| GeneratorError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.config.output_file(&table_meta.class_name);
        fs::write(&path, content).map_err(|source| GeneratorError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldMeta;
    use std::collections::BTreeSet;

    fn field(java_name: &str, db_name: &str, java_type: &str, custom: bool) -> FieldMeta {
        FieldMeta {
            java_name: java_name.into(),
            db_name: db_name.into(),
            java_type: java_type.into(),
            has_custom_mapping: custom,
        }
    }

    fn order_items() -> TableMeta {
        TableMeta {
            package_name: "com.acme.model".into(),
            class_name: "OrderItems".into(),
            db_table_name: "order_items".into(),
            has_custom_table_mapping: true,
            pk_columns: vec![field("id", "id", "Integer", false)],
            columns: vec![
                field("orderId", "order_id", "Long", false),
                field("price", "unit_price", "BigDecimal", true),
            ],
            has_composite_pk: false,
            imports: BTreeSet::from(["java.math.BigDecimal".to_string()]),
            unmapped_columns: vec![],
        }
    }

    #[test]
    fn context_uses_template_keys() {
        let value = serde_json::to_value(order_items()).unwrap();

        assert_eq!(value["packageName"], "com.acme.model");
        assert_eq!(value["className"], "OrderItems");
        assert_eq!(value["dbTableName"], "order_items");
        assert_eq!(value["hasCustomTableMapping"], true);
        assert_eq!(value["hasCompositePk"], false);
        assert_eq!(value["imports"], serde_json::json!(["java.math.BigDecimal"]));
        assert_eq!(
            value["pkColumns"],
            serde_json::json!([{"javaName": "id", "dbName": "id", "type": "Integer", "hasCustomMapping": false}])
        );
        assert_eq!(value["columns"][1]["hasCustomMapping"], true);
        assert!(value.get("unmappedColumns").is_none());
    }

    #[test]
    fn default_template_renders_a_record() {
        let renderer = RecordRenderer::load(None).unwrap();
        let java = renderer.render(&order_items()).unwrap();

        assert!(java.starts_with("package com.acme.model;"));
        assert!(java.contains("import java.math.BigDecimal;"));
        assert!(java.contains("@Table(\"order_items\")"));
        assert!(java.contains("public record OrderItems("));
        assert!(java.contains("@Id Integer id,"));
        assert!(java.contains("Long orderId,"));
        assert!(java.contains("@Column(\"unit_price\") BigDecimal price"));
        assert!(!java.contains("Embedded"));
    }

    #[test]
    fn composite_keys_render_an_embedded_id() {
        let mut meta = order_items();
        meta.pk_columns.push(field("lineNo", "line_no", "Integer", false));
        meta.has_composite_pk = true;

        let java = RecordRenderer::load(None).unwrap().render(&meta).unwrap();

        assert!(java.contains("@Id @Embedded.Empty OrderItemsId id,"));
        assert!(java.contains("public record OrderItemsId("));
        assert!(java.contains("Integer lineNo"));
    }

    #[test]
    fn custom_template_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("table-record.hbs"),
            "{{className}}:{{#each imports}}{{this}};{{/each}}",
        )
        .unwrap();

        let renderer = RecordRenderer::load(Some(dir.path())).unwrap();
        assert_eq!(renderer.render(&order_items()).unwrap(), "OrderItems:java.math.BigDecimal;");
    }

    #[test]
    fn missing_template_source_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            RecordRenderer::load(Some(&dir.path().join("absent"))),
            Err(GeneratorError::Configuration { .. })
        ));
        assert!(matches!(
            RecordRenderer::load(Some(dir.path())),
            Err(GeneratorError::Configuration { .. })
        ));
    }

    #[test]
    fn broken_template_is_a_render_error() {
        assert!(matches!(
            RecordRenderer::from_source("{{#each columns}}"),
            Err(GeneratorError::Render { .. })
        ));
    }

    #[test]
    fn writes_under_package_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::new("com.acme.model").output_path(dir.path());
        let generator = RecordGenerator::with_parts(
            config,
            GeneratorMappings::default(),
            RecordRenderer::from_source("class {{className}}").unwrap(),
        );

        let path = generator.write_record(&order_items()).unwrap();

        assert_eq!(path, dir.path().join("com/acme/model/OrderItems.java"));
        assert_eq!(fs::read_to_string(path).unwrap(), "class OrderItems");
    }
}
