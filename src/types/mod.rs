pub mod column_meta;
pub mod field_meta;
pub mod sql_type;
pub mod table_meta;

pub use column_meta::ColumnMeta;
pub use field_meta::FieldMeta;
pub use table_meta::TableMeta;
