use super::field_meta::FieldMeta;
use serde_derive::Serialize;
use std::collections::BTreeSet;

/// Everything the record template needs to render one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    pub package_name: String,
    pub class_name: String, // PascalCase or override
    pub db_table_name: String,
    pub has_custom_table_mapping: bool,
    pub pk_columns: Vec<FieldMeta>,
    pub columns: Vec<FieldMeta>,
    pub has_composite_pk: bool,
    pub imports: BTreeSet<String>, // sorted, no java.lang
    #[serde(skip)]
    pub unmapped_columns: Vec<String>, // degraded to Object
}
