use crate::types::sql_type;
use crate::types::ColumnMeta;
use tracing::warn;

pub const INTEGER_CLASS: &str = "java.lang.Integer";
pub const LONG_CLASS: &str = "java.lang.Long";
pub const DOUBLE_CLASS: &str = "java.lang.Double";
pub const STRING_CLASS: &str = "java.lang.String";
pub const BOOLEAN_CLASS: &str = "java.lang.Boolean";
pub const OBJECT_CLASS: &str = "java.lang.Object";
pub const BIG_DECIMAL_CLASS: &str = "java.math.BigDecimal";
pub const LOCAL_DATE_TIME_CLASS: &str = "java.time.LocalDateTime";
pub const LOCAL_DATE_CLASS: &str = "java.time.LocalDate";
pub const LOCAL_TIME_CLASS: &str = "java.time.LocalTime";
pub const OFFSET_DATE_TIME_CLASS: &str = "java.time.OffsetDateTime";
pub const INSTANT_CLASS: &str = "java.time.Instant";
pub const UUID_CLASS: &str = "java.util.UUID";
pub const JSON_NODE_CLASS: &str = "com.fasterxml.jackson.databind.JsonNode";
pub const BYTE_ARRAY: &str = "byte[]";

/// Package whose classes never need an import.
const IMPLICIT_PACKAGE: &str = "java.lang.";

/// Representation used for every timezone-aware column of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampTz {
    #[default]
    Instant,
    OffsetDateTime,
}

impl TimestampTz {
    pub fn class_name(self) -> &'static str {
        match self {
            TimestampTz::Instant => INSTANT_CLASS,
            TimestampTz::OffsetDateTime => OFFSET_DATE_TIME_CLASS,
        }
    }
}

/// Resolved Java type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    pub qualified: &'static str,
    /// Set when no rule matched and the column degraded to `Object`.
    pub fallback: bool,
}

impl TypeMapping {
    fn mapped(qualified: &'static str) -> Self {
        Self {
            qualified,
            fallback: false,
        }
    }

    pub fn simple_name(&self) -> &'static str {
        match self.qualified.rfind('.') {
            Some(pos) => &self.qualified[pos + 1..],
            None => self.qualified,
        }
    }

    pub fn requires_import(&self) -> bool {
        self.qualified.contains('.') && !self.qualified.starts_with(IMPLICIT_PACKAGE)
    }
}

/// Normalized bucket of JDBC type codes, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeCategory {
    Integer,
    BigInt,
    ExactNumeric,
    Floating,
    Text,
    Boolean,
    TimestampTz,
    Timestamp,
    Date,
    Time,
    Binary,
    Special,
    Unknown,
}

impl TypeCategory {
    fn of(sql_type: i32) -> Self {
        match sql_type {
            sql_type::INTEGER | sql_type::SMALLINT | sql_type::TINYINT => TypeCategory::Integer,
            sql_type::BIGINT => TypeCategory::BigInt,
            sql_type::DECIMAL | sql_type::NUMERIC => TypeCategory::ExactNumeric,
            sql_type::FLOAT | sql_type::REAL | sql_type::DOUBLE => TypeCategory::Floating,
            sql_type::VARCHAR
            | sql_type::CHAR
            | sql_type::LONGVARCHAR
            | sql_type::CLOB
            | sql_type::NVARCHAR
            | sql_type::NCHAR => TypeCategory::Text,
            sql_type::BOOLEAN | sql_type::BIT => TypeCategory::Boolean,
            sql_type::MSSQL_DATETIMEOFFSET | sql_type::TIMESTAMP_WITH_TIMEZONE => {
                TypeCategory::TimestampTz
            }
            sql_type::TIMESTAMP => TypeCategory::Timestamp,
            sql_type::DATE => TypeCategory::Date,
            sql_type::TIME => TypeCategory::Time,
            sql_type::BINARY | sql_type::VARBINARY | sql_type::LONGVARBINARY | sql_type::BLOB => {
                TypeCategory::Binary
            }
            sql_type::OTHER | sql_type::ROWID => TypeCategory::Special,
            _ => TypeCategory::Unknown,
        }
    }
}

/// Maps JDBC column metadata to Java classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper {
    timestamp_tz: TimestampTz,
}

impl TypeMapper {
    pub fn new(timestamp_tz: TimestampTz) -> Self {
        Self { timestamp_tz }
    }

    pub fn map_column(&self, column: &ColumnMeta) -> TypeMapping {
        self.map_type(column.sql_type, &column.type_name, column.precision, column.scale)
    }

    pub fn map_type(&self, sql_type: i32, type_name: &str, precision: i32, scale: i32) -> TypeMapping {
        let name = type_name.to_lowercase();
        let timestamp_tz = self.timestamp_tz.class_name();

        let qualified = match TypeCategory::of(sql_type) {
            TypeCategory::Integer => INTEGER_CLASS,
            TypeCategory::BigInt => LONG_CLASS,
            // scale 0, or -127 on Oracle, means no fractional digits
            TypeCategory::ExactNumeric if scale <= 0 => {
                if precision > 0 && precision < 10 {
                    INTEGER_CLASS
                } else {
                    LONG_CLASS
                }
            }
            TypeCategory::ExactNumeric => BIG_DECIMAL_CLASS,
            TypeCategory::Floating => DOUBLE_CLASS,
            TypeCategory::Text => STRING_CLASS,
            TypeCategory::Boolean => BOOLEAN_CLASS,
            TypeCategory::TimestampTz => timestamp_tz,
            TypeCategory::Timestamp if name.contains("tz") || name.contains("offset") => timestamp_tz,
            TypeCategory::Timestamp => LOCAL_DATE_TIME_CLASS,
            TypeCategory::Date => LOCAL_DATE_CLASS,
            TypeCategory::Time => LOCAL_TIME_CLASS,
            TypeCategory::Binary => BYTE_ARRAY,
            TypeCategory::Special => match name.as_str() {
                "json" | "jsonb" => JSON_NODE_CLASS,
                "uuid" => UUID_CLASS,
                _ => STRING_CLASS,
            },
            TypeCategory::Unknown if name.contains("json") => JSON_NODE_CLASS,
            TypeCategory::Unknown => {
                warn!(
                    "Unsupported SQL type: {} (name: {}), falling back to Object",
                    sql_type, name
                );
                return TypeMapping {
                    qualified: OBJECT_CLASS,
                    fallback: true,
                };
            }
        };

        TypeMapping::mapped(qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn map_logged(sql_type: i32, type_name: &str) -> (TypeMapping, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let mapping = tracing::subscriber::with_default(subscriber, || {
            TypeMapper::default().map_type(sql_type, type_name, 0, 0)
        });
        (mapping, logs.contents())
    }

    fn map(sql_type: i32, type_name: &str, precision: i32, scale: i32) -> &'static str {
        TypeMapper::default()
            .map_type(sql_type, type_name, precision, scale)
            .qualified
    }

    #[test]
    fn integral_codes() {
        assert_eq!(map(sql_type::INTEGER, "int4", 10, 0), INTEGER_CLASS);
        assert_eq!(map(sql_type::SMALLINT, "int2", 5, 0), INTEGER_CLASS);
        assert_eq!(map(sql_type::TINYINT, "tinyint", 3, 0), INTEGER_CLASS);
        assert_eq!(map(sql_type::BIGINT, "int8", 19, 0), LONG_CLASS);
    }

    #[test]
    fn exact_numeric_thresholds() {
        assert_eq!(map(sql_type::DECIMAL, "decimal", 5, 0), INTEGER_CLASS);
        assert_eq!(map(sql_type::DECIMAL, "decimal", 9, 0), INTEGER_CLASS);
        assert_eq!(map(sql_type::DECIMAL, "decimal", 10, 0), LONG_CLASS);
        assert_eq!(map(sql_type::DECIMAL, "decimal", 15, 0), LONG_CLASS);
        assert_eq!(map(sql_type::NUMERIC, "number", 0, 0), LONG_CLASS);
        assert_eq!(map(sql_type::NUMERIC, "number", 38, -127), LONG_CLASS);
        assert_eq!(map(sql_type::NUMERIC, "number", 4, -127), INTEGER_CLASS);
        assert_eq!(map(sql_type::DECIMAL, "decimal", 10, 2), BIG_DECIMAL_CLASS);
        assert_eq!(map(sql_type::NUMERIC, "numeric", 5, 1), BIG_DECIMAL_CLASS);
    }

    #[test]
    fn floating_text_and_boolean_codes() {
        for code in [sql_type::FLOAT, sql_type::REAL, sql_type::DOUBLE] {
            assert_eq!(map(code, "float8", 17, 17), DOUBLE_CLASS);
        }
        for code in [
            sql_type::VARCHAR,
            sql_type::CHAR,
            sql_type::LONGVARCHAR,
            sql_type::CLOB,
            sql_type::NVARCHAR,
            sql_type::NCHAR,
        ] {
            assert_eq!(map(code, "text", 0, 0), STRING_CLASS);
        }
        assert_eq!(map(sql_type::BOOLEAN, "boolean", 1, 0), BOOLEAN_CLASS);
        assert_eq!(map(sql_type::BIT, "bool", 1, 0), BOOLEAN_CLASS);
    }

    #[test]
    fn timezone_aware_codes_follow_run_selection() {
        let instant = TypeMapper::new(TimestampTz::Instant);
        let offset = TypeMapper::new(TimestampTz::OffsetDateTime);

        for code in [sql_type::TIMESTAMP_WITH_TIMEZONE, sql_type::MSSQL_DATETIMEOFFSET] {
            assert_eq!(instant.map_type(code, "datetimeoffset", 0, 0).qualified, INSTANT_CLASS);
            assert_eq!(offset.map_type(code, "datetimeoffset", 0, 0).qualified, OFFSET_DATE_TIME_CLASS);
        }
    }

    #[test]
    fn plain_timestamp_uses_name_hint() {
        let offset = TypeMapper::new(TimestampTz::OffsetDateTime);

        assert_eq!(offset.map_type(sql_type::TIMESTAMP, "timestamptz", 0, 0).qualified, OFFSET_DATE_TIME_CLASS);
        assert_eq!(offset.map_type(sql_type::TIMESTAMP, "DateTimeOffset", 0, 0).qualified, OFFSET_DATE_TIME_CLASS);
        assert_eq!(offset.map_type(sql_type::TIMESTAMP, "TIMESTAMPTZ", 0, 0).qualified, OFFSET_DATE_TIME_CLASS);
        assert_eq!(offset.map_type(sql_type::TIMESTAMP, "timestamp", 0, 0).qualified, LOCAL_DATE_TIME_CLASS);
        assert_eq!(map(sql_type::TIMESTAMP, "timestamptz", 0, 0), INSTANT_CLASS);
    }

    #[test]
    fn date_time_and_binary_codes() {
        assert_eq!(map(sql_type::DATE, "date", 0, 0), LOCAL_DATE_CLASS);
        assert_eq!(map(sql_type::TIME, "time", 0, 0), LOCAL_TIME_CLASS);
        for code in [sql_type::BINARY, sql_type::VARBINARY, sql_type::LONGVARBINARY, sql_type::BLOB] {
            assert_eq!(map(code, "bytea", 0, 0), BYTE_ARRAY);
        }
    }

    #[test]
    fn special_codes_inspect_type_name() {
        assert_eq!(map(sql_type::OTHER, "jsonb", 0, 0), JSON_NODE_CLASS);
        assert_eq!(map(sql_type::OTHER, "JSON", 0, 0), JSON_NODE_CLASS);
        assert_eq!(map(sql_type::OTHER, "uuid", 0, 0), UUID_CLASS);
        assert_eq!(map(sql_type::OTHER, "citext", 0, 0), STRING_CLASS);
        assert_eq!(map(sql_type::OTHER, "json_array", 0, 0), STRING_CLASS);
        assert_eq!(map(sql_type::ROWID, "rowid", 0, 0), STRING_CLASS);
    }

    #[test]
    fn unknown_codes_fall_back() {
        let mapper = TypeMapper::default();

        let json = mapper.map_type(sql_type::ARRAY, "_jsonb", 0, 0);
        assert_eq!(json.qualified, JSON_NODE_CLASS);
        assert!(!json.fallback);

        let object = mapper.map_type(sql_type::ARRAY, "_int4", 0, 0);
        assert_eq!(object.qualified, OBJECT_CLASS);
        assert!(object.fallback);

        let null = mapper.map_type(sql_type::NULL, "", 0, 0);
        assert_eq!(null.qualified, OBJECT_CLASS);
        assert!(null.fallback);

        let time_tz = mapper.map_type(sql_type::TIME_WITH_TIMEZONE, "timetz", 0, 0);
        assert_eq!(time_tz.qualified, OBJECT_CLASS);
        assert!(time_tz.fallback);
    }

    #[test]
    fn fallback_logs_a_warning() {
        let (mapping, logs) = map_logged(sql_type::TIME_WITH_TIMEZONE, "TIMETZ");

        assert!(mapping.fallback);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(
            logs.contains("Unsupported SQL type: 2013 (name: timetz), falling back to Object"),
            "{logs}"
        );
    }

    #[test]
    fn mapped_types_log_nothing() {
        for (code, name) in [(sql_type::ARRAY, "_jsonb"), (sql_type::INTEGER, "int4")] {
            let (mapping, logs) = map_logged(code, name);

            assert!(!mapping.fallback);
            assert!(logs.is_empty(), "{logs}");
        }
    }

    #[test]
    fn simple_names_and_imports() {
        let mapper = TypeMapper::default();

        let decimal = mapper.map_type(sql_type::DECIMAL, "decimal", 10, 2);
        assert_eq!(decimal.simple_name(), "BigDecimal");
        assert!(decimal.requires_import());

        let integer = mapper.map_type(sql_type::INTEGER, "int", 10, 0);
        assert_eq!(integer.simple_name(), "Integer");
        assert!(!integer.requires_import());

        let bytes = mapper.map_type(sql_type::BLOB, "blob", 0, 0);
        assert_eq!(bytes.simple_name(), "byte[]");
        assert!(!bytes.requires_import());

        let object = mapper.map_type(sql_type::NULL, "", 0, 0);
        assert_eq!(object.simple_name(), "Object");
        assert!(!object.requires_import());

        assert!(mapper.map_type(sql_type::OTHER, "uuid", 0, 0).requires_import());
    }
}
