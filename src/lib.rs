pub mod column_mapping;
pub mod config;
pub mod database_schema;
pub mod drivers;
pub mod error;
pub mod mappings;
pub mod naming;
pub mod record_generator;
pub mod types;

pub use error::{GeneratorError, Result};
