//! User supplied table filters and name overrides.
//!
//! The document has two sections:
//!
//! ```toml
//! [filters]
//! include = ["^usr_.*"]
//! exclude = ["^usr_tmp$"]
//!
//! [mappings.tables]
//! usr_orders = "Order"
//!
//! [mappings.columns.usr_orders]
//! ord_ts = "placedAt"
//! ```
//!
//! The same shape is accepted as YAML when the file ends in `.yaml`/`.yml`.
//!
//! Filter patterns are compiled with `fancy-regex`, so look-around and
//! backreferences work as they do in Java patterns.

use crate::error::{GeneratorError, Result};
use crate::naming::{ToCamelCase, ToPascalCase};
use fancy_regex::Regex;
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Include pattern that disables include filtering altogether.
pub const MATCH_ALL: &str = ".*";

#[derive(Debug, Default, Deserialize)]
struct MappingsDocument {
    filters: Option<FiltersDocument>,
    mappings: Option<OverridesDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct FiltersDocument {
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct OverridesDocument {
    tables: Option<HashMap<String, String>>,
    columns: Option<HashMap<String, HashMap<String, String>>>,
}

/// Compiled include/exclude table name patterns. Patterns match the whole
/// table name, never a substring.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl FilterSet {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        let include = if include.iter().any(|p| p.as_ref() == MATCH_ALL) {
            Vec::new()
        } else {
            compile_patterns(include)?
        };

        Ok(Self {
            include,
            exclude: compile_patterns(exclude)?,
        })
    }

    pub fn is_included(&self, table_name: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|p| matches(p, table_name))
    }

    pub fn is_excluded(&self, table_name: &str) -> bool {
        self.exclude.iter().any(|p| matches(p, table_name))
    }

    pub fn should_process(&self, table_name: &str) -> bool {
        self.is_included(table_name) && !self.is_excluded(table_name)
    }
}

/// A pattern that exceeds the backtracking limit counts as not matching.
fn matches(pattern: &Regex, table_name: &str) -> bool {
    pattern.is_match(table_name).unwrap_or_else(|e| {
        warn!("Pattern {} gave up on table {}: {}", pattern.as_str(), table_name, e);
        false
    })
}

fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .filter(|pattern| !pattern.trim().is_empty())
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| GeneratorError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

/// Output name resolved for a column, and whether it came from an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedName {
    pub name: String,
    pub custom: bool,
}

/// Custom class names per table and custom field names per table column.
/// Keys are matched exactly as written in the document.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    tables: HashMap<String, String>,
    columns: HashMap<String, HashMap<String, String>>,
}

impl OverrideRegistry {
    pub fn new(
        tables: HashMap<String, String>,
        columns: HashMap<String, HashMap<String, String>>,
    ) -> Self {
        Self { tables, columns }
    }

    pub fn mapped_table_name(&self, table_name: &str) -> String {
        match self.tables.get(table_name) {
            Some(class_name) => class_name.clone(),
            None => table_name.to_pascal_case(),
        }
    }

    pub fn mapped_column_name(&self, table_name: &str, column_name: &str) -> MappedName {
        match self
            .columns
            .get(table_name)
            .and_then(|columns| columns.get(column_name))
        {
            Some(name) => MappedName {
                name: name.clone(),
                custom: true,
            },
            None => MappedName {
                name: column_name.to_camel_case(),
                custom: false,
            },
        }
    }
}

/// Filters and overrides loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorMappings {
    pub filters: FilterSet,
    pub overrides: OverrideRegistry,
}

impl GeneratorMappings {
    /// Loads the mappings document, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No mappings file specified. Falling back to default values.");
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(GeneratorError::configuration(path, "mappings file does not exist"));
        }
        info!("Using mappings file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::configuration_caused(path, "failed to read mappings file", e)
        })?;

        let document = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str::<Option<MappingsDocument>>(&content)
                .map(Option::unwrap_or_default)
                .map_err(|e| {
                    GeneratorError::configuration_caused(path, "failed to parse mappings file", e)
                })?,
            _ => toml::from_str::<MappingsDocument>(&content).map_err(|e| {
                GeneratorError::configuration_caused(path, "failed to parse mappings file", e)
            })?,
        };

        Self::from_document(document)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let document = toml::from_str::<MappingsDocument>(content).map_err(|e| {
            GeneratorError::configuration_caused("<inline>", "failed to parse mappings", e)
        })?;

        Self::from_document(document)
    }

    fn from_document(document: MappingsDocument) -> Result<Self> {
        let filters = document.filters.unwrap_or_default();
        let overrides = document.mappings.unwrap_or_default();

        Ok(Self {
            filters: FilterSet::new(
                &filters.include.unwrap_or_default(),
                &filters.exclude.unwrap_or_default(),
            )?,
            overrides: OverrideRegistry::new(
                overrides.tables.unwrap_or_default(),
                overrides.columns.unwrap_or_default(),
            ),
        })
    }

    pub fn should_process_table(&self, table_name: &str) -> bool {
        self.filters.should_process(table_name)
    }
}
