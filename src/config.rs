//! Run parameters and the database connection document.

use crate::column_mapping::TimestampTz;
use crate::error::{GeneratorError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const JDBC_URL: &str = "jdbc.url";
pub const JDBC_USER: &str = "jdbc.user";
pub const JDBC_PASS: &str = "jdbc.pass";
pub const JDBC_SCHEMA: &str = "jdbc.schema";

pub const DEFAULT_OUTPUT_PATH: &str = "target/generated-sources/jdbc-records";
pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_EXTENSION: &str = "java";

/// Parameters of one generation run, fixed once parsed.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub package_name: String,
    pub output_path: PathBuf,
    pub env_path: PathBuf,
    pub mappings_path: Option<PathBuf>,
    pub templates_path: Option<PathBuf>,
    pub timestamp_tz: TimestampTz,
    pub extension: String,
}

impl GeneratorConfig {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            env_path: PathBuf::from(DEFAULT_ENV_PATH),
            mappings_path: None,
            templates_path: None,
            timestamp_tz: TimestampTz::default(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn env_path(mut self, env_path: impl Into<PathBuf>) -> Self {
        self.env_path = env_path.into();
        self
    }

    pub fn mappings_path(mut self, mappings_path: Option<PathBuf>) -> Self {
        self.mappings_path = mappings_path;
        self
    }

    pub fn templates_path(mut self, templates_path: Option<PathBuf>) -> Self {
        self.templates_path = templates_path;
        self
    }

    pub fn use_offset_date_time(mut self, enabled: bool) -> Self {
        self.timestamp_tz = if enabled {
            TimestampTz::OffsetDateTime
        } else {
            TimestampTz::Instant
        };
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// `<output>/<package as directories>`
    pub fn package_dir(&self) -> PathBuf {
        self.package_name
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self.output_path.clone(), |dir, segment| dir.join(segment))
    }

    pub fn output_file(&self, class_name: &str) -> PathBuf {
        self.package_dir()
            .join(format!("{}.{}", class_name, self.extension))
    }
}

/// Connection settings read from a Java-style `.properties` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
}

impl ConnectionSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::configuration_caused(path, "failed to load DB properties file", e)
        })?;

        let mut properties = parse_properties(&content);
        let url = properties
            .remove(JDBC_URL)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| GeneratorError::configuration(path, format!("`{JDBC_URL}` is not set")))?;

        Ok(Self {
            url,
            user: properties.remove(JDBC_USER),
            password: properties.remove(JDBC_PASS),
            schema: properties.remove(JDBC_SCHEMA).filter(|s| !s.is_empty()),
        })
    }
}

/// Parses the `java.util.Properties` text format.
///
/// The key ends at the first unescaped `=`, `:` or blank; the value is the
/// rest of the logical line with leading blanks removed. Lines starting with
/// `#` or `!` are comments, a trailing odd run of `\` joins the next line,
/// and `\t`, `\n`, `\r`, `\f`, `\uXXXX` escapes are decoded. Any other
/// escaped character stands for itself. Quotes are kept as written.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let line = line.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with(['#', '!']) {
            continue;
        }

        let mut logical = String::new();
        let mut current = line;
        while continues(current) {
            logical.push_str(&current[..current.len() - 1]);
            match lines.next() {
                Some(next) => current = next.trim_start_matches(is_blank),
                None => {
                    current = "";
                    break;
                }
            }
        }
        logical.push_str(current);

        let (key, value) = split_entry(&logical);
        properties.insert(unescape(key), unescape(value));
    }

    properties
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0C')
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let key_end = line
        .char_indices()
        .find(|&(_, c)| {
            if escaped {
                escaped = false;
                return false;
            }
            escaped = c == '\\';
            c == '=' || c == ':' || is_blank(c)
        })
        .map_or(line.len(), |(i, _)| i);

    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0C'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = (hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        chars.nth(3);
                    }
                    None => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
