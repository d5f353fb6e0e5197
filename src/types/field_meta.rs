use serde_derive::Serialize;

/// A generated record component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub java_name: String, // camelCase or override
    pub db_name: String,
    #[serde(rename = "type")]
    pub java_type: String, // simple class name
    pub has_custom_mapping: bool,
}
