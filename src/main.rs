use anyhow::Context;
use clap::Parser;
use jdbc_record_generator::config::{GeneratorConfig, DEFAULT_ENV_PATH, DEFAULT_EXTENSION, DEFAULT_OUTPUT_PATH};
use jdbc_record_generator::record_generator::{GenerationSummary, RecordGenerator};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Generates one Java record per database table.
#[derive(Parser, Debug)]
#[command(name = "record-generator")]
#[command(version)]
struct Cli {
    /// Java package of the generated records, e.g. `com.acme.model`
    #[arg(long)]
    package_name: String,

    /// Root directory of the generated sources
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Properties file with jdbc.url, jdbc.user, jdbc.pass and jdbc.schema
    #[arg(long, default_value = DEFAULT_ENV_PATH)]
    env: PathBuf,

    /// Table filters and name overrides (TOML, or YAML by extension)
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// Directory containing a custom `table-record.hbs`
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Map timezone-aware timestamps to OffsetDateTime instead of Instant
    #[arg(long)]
    use_offset_date_time: bool,

    /// Extension of the generated files
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,
}

impl Cli {
    fn into_config(self) -> GeneratorConfig {
        GeneratorConfig::new(self.package_name)
            .output_path(self.output)
            .env_path(self.env)
            .mappings_path(self.mappings)
            .templates_path(self.templates)
            .use_offset_date_time(self.use_offset_date_time)
            .extension(self.extension)
    }
}

async fn generate(config: GeneratorConfig) -> jdbc_record_generator::Result<GenerationSummary> {
    let generator = RecordGenerator::new(config)?;
    generator.run().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();

    info!("Starting record generation for package {}", config.package_name);

    match generate(config).await {
        Ok(summary) => {
            info!(
                "Generated {} of {} tables ({} skipped, {} columns mapped to Object)",
                summary.written.len(),
                summary.tables_seen,
                summary.skipped.len(),
                summary.unmapped_columns
            );
            Ok(())
        }
        Err(err) => {
            error!("Critical error during record generation: {}", err);
            Err::<(), _>(err).context("Generation failed")
        }
    }
}
