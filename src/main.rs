//! CLI entry point for the antenna rollout analytics tool.
//!
//! Loads antenna records from CSV, runs the analytics pipeline, and writes
//! the resulting tables locally and optionally to S3.

use anyhow::{Context, Result};
use antenna_rollout::analyzers::cluster::{
    ClusterConfig, DEFAULT_MIN_NEIGHBORS, DEFAULT_NEIGHBORHOOD_RADIUS,
};
use antenna_rollout::analyzers::pipeline::run_pipeline;
use antenna_rollout::analyzers::types::AnalysisBundle;
use antenna_rollout::output::{print_json, print_pretty, print_summary};
use antenna_rollout::record::Dataset;
use antenna_rollout::store::{BundleStore, LocalStore, S3Store};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "antenna_rollout")]
#[command(about = "Analyze 4G/5G antenna rollout from site records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ClusterArgs {
    /// Neighbourhood radius for density clustering, in coordinate degrees
    #[arg(long, env = "CLUSTER_RADIUS", default_value_t = DEFAULT_NEIGHBORHOOD_RADIUS)]
    radius: f64,

    /// Minimum neighbourhood size (point included) for a dense region
    #[arg(long, env = "CLUSTER_MIN_NEIGHBORS", default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: usize,
}

impl ClusterArgs {
    fn config(&self) -> Result<ClusterConfig> {
        Ok(ClusterConfig::new(self.radius, self.min_neighbors)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and save every derived table
    Analyze {
        /// CSV file of antenna records
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Directory to write CSV tables and bundle.json into
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,

        #[command(flatten)]
        cluster: ClusterArgs,

        /// Optional: S3 bucket to upload the JSON bundle to (e.g., "my-bucket")
        #[arg(long, env = "S3_BUCKET")]
        s3_bucket: Option<String>,

        /// Key prefix for S3 uploads
        #[arg(long, default_value = "aggregates")]
        s3_prefix: String,

        /// Gzip compress JSON before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Run the pipeline and log headline statistics
    Summary {
        /// CSV file of antenna records
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        cluster: ClusterArgs,

        /// Also log the full bundle as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/antenna_rollout.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("antenna_rollout.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            cluster,
            s3_bucket,
            s3_prefix,
            gzip,
        } => {
            let bundle = load_and_run(&input, &cluster.config()?)?;

            let mut stores: Vec<Box<dyn BundleStore>> = vec![Box::new(LocalStore::new(output_dir))];
            if let Some(bucket) = s3_bucket {
                info!(bucket = %bucket, gzip, "S3 upload enabled");
                let config = aws_config::load_from_env().await;
                stores.push(Box::new(
                    S3Store::new(&config, bucket, gzip).with_prefix(s3_prefix),
                ));
            }

            for store in &stores {
                store.save(&bundle).await?;
            }
            print_summary(&bundle);
        }
        Commands::Summary {
            input,
            cluster,
            json,
        } => {
            let bundle = load_and_run(&input, &cluster.config()?)?;
            print_pretty(&bundle);
            print_summary(&bundle);
            if json {
                print_json(&bundle)?;
            }
        }
    }

    Ok(())
}

/// Reads the CSV at `input` and runs the full pipeline on it.
#[tracing::instrument(skip(config), fields(input = %input.display()))]
fn load_and_run(input: &Path, config: &ClusterConfig) -> Result<AnalysisBundle> {
    let dataset = Dataset::from_path(input)
        .with_context(|| format!("loading records from '{}'", input.display()))?;
    info!(records = dataset.len(), "Records loaded");

    Ok(run_pipeline(&dataset, config)?)
}
