/// One column as reported by the metadata driver, in driver order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMeta {
    pub column_name: String, // as stored in the database
    pub sql_type: i32,       // java.sql.Types code
    pub type_name: String,   // raw driver type name, e.g. "timestamptz"
    pub precision: i32,
    pub scale: i32,
}

impl ColumnMeta {
    pub fn new(column_name: impl Into<String>, sql_type: i32, type_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            sql_type,
            type_name: type_name.into(),
            precision: 0,
            scale: 0,
        }
    }

    pub fn with_precision(mut self, precision: i32, scale: i32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }
}
