//! cloudharvest - read live cloud resources, emit normalized records
//!
//! Thin front end over the discovery engine: binds flags to backend
//! configuration, drives per-type discovery, and renders the normalized
//! resources as JSON for downstream writers.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use cloudharvest::backends::huaweicloud::resource_types as huaweicloud_resource_types;
use cloudharvest::backends::huaweicloud::{HuaweiCloudConfig, HuaweiCloudProvider};
use cloudharvest::{Filter, Provider};

#[derive(Parser)]
#[command(name = "cloudharvest")]
#[command(author, version, about = "Reads cloud resources and emits normalized records", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read from Huawei Cloud
    Huaweicloud(HuaweicloudArgs),
}

#[derive(Args)]
struct HuaweicloudArgs {
    #[command(subcommand)]
    action: Option<HuaweicloudAction>,

    /// Region to search in
    #[arg(long, env = "HUAWEICLOUD_REGION")]
    region: Option<String>,

    /// Project ID scope for API calls
    #[arg(long, env = "HUAWEICLOUD_PROJECT_ID")]
    project_id: Option<String>,

    /// Access key
    #[arg(long, env = "HUAWEICLOUD_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Secret key
    #[arg(long, env = "HUAWEICLOUD_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Security token for temporary credentials
    #[arg(long, env = "HUAWEICLOUD_SECURITY_TOKEN", hide_env_values = true)]
    security_token: Option<String>,

    /// Tags to filter with, format 'NAME:VALUE'
    #[arg(short = 't', long = "tags")]
    tags: Vec<String>,

    /// Resource types to include (default: all supported)
    #[arg(short, long)]
    include: Vec<String>,

    /// Resource types to exclude
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Resource identifiers to restrict discovery to
    #[arg(long)]
    target: Vec<String>,

    /// Write the JSON document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum HuaweicloudAction {
    /// List all the Huawei Cloud supported resource types
    Resources,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the JSON document; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Huaweicloud(args) => {
            if let Some(HuaweicloudAction::Resources) = args.action {
                // Registry order, no backend calls, no credentials needed.
                for resource_type in huaweicloud_resource_types::registry().list() {
                    println!("{resource_type}");
                }
                return Ok(());
            }

            let config = HuaweiCloudConfig::new(
                required_flag("region", args.region)?,
                required_flag("project-id", args.project_id)?,
                required_flag("access-key", args.access_key)?,
                required_flag("secret-key", args.secret_key)?,
            );
            let config = match args.security_token {
                Some(token) => config.with_security_token(token),
                None => config,
            };

            let filter = Filter::new()
                .with_include(args.include)
                .with_exclude(args.exclude)
                .with_targets(args.target)
                .with_tag_selectors(&args.tags)?;

            let provider = HuaweiCloudProvider::new(config)?;
            run_import(&provider, &filter, args.output.as_deref()).await
        }
    }
}

fn required_flag(name: &str, value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => anyhow::bail!("required flag --{name} is not set"),
    }
}

/// Discover every included resource type and render the result document.
///
/// A failure for one type aborts only that type; the session continues and
/// the process exits non-zero at the end if anything failed.
async fn run_import(
    provider: &dyn Provider,
    filter: &Filter,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let mut resources = Map::new();
    let mut failed: Vec<String> = Vec::new();

    for resource_type in provider.resource_types() {
        if !filter.allows_type(resource_type) {
            continue;
        }

        info!(resource_type, "discovering");
        match provider.resources(resource_type, filter).await {
            Ok(discovered) => {
                info!(resource_type, count = discovered.len(), "discovered");
                let mut fixed = Vec::with_capacity(discovered.len());
                for resource in discovered {
                    let mut value = serde_json::to_value(&resource)?;
                    if let Some(attrs) = value.get_mut("attributes") {
                        *attrs = provider.fix_resource(resource_type, attrs.take())?;
                    }
                    fixed.push(value);
                }
                resources.insert(resource_type.to_string(), Value::Array(fixed));
            }
            Err(err) => {
                error!(provider = provider.name(), resource_type, error = %err, "discovery failed");
                failed.push(resource_type.to_string());
            }
        }
    }

    let document = json!({
        "provider": provider.name(),
        "source": provider.source(),
        "version": provider.version(),
        "region": provider.region(),
        "configuration": provider.configuration(),
        "resources": Value::Object(resources),
    });

    write_output(&document, output)?;

    if !failed.is_empty() {
        anyhow::bail!("discovery failed for: {}", failed.join(", "));
    }
    Ok(())
}

fn write_output(document: &Value, output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(document)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
