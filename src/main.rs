use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use artifact_core::artifact;
use artifact_core::artifact::service::ArtifactService;
use artifact_core::authorize::AllowAllAuthorizer;
use artifact_core::backend::{BlobContainer, S3Bucket};
use artifact_core::config::ServiceConfig;
use artifact_core::publish::TracingPublisher;
use artifact_core::region::{RegionTable, StaticRegionResolver};
use artifact_core::task::InMemoryTaskReader;
use artifact_core::web;

/// artifact-core: the artifact mediation core of a task-queue service.
#[derive(Parser, Debug)]
#[command(name = "artifact-core")]
#[command(author = "ANODE Team")]
#[command(version = "0.1.0")]
#[command(about = "Authorize, register, and serve task artifacts")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Generate a sample configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Path to the service config file (YAML)
    #[arg(short, long, default_value = "artifact-core.yaml")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output path for the config file
    #[arg(short, long, default_value = "artifact-core.yaml")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match args.command {
        Command::Serve(serve_args) => serve(serve_args).await?,
        Command::Init(init_args) => generate_sample_config(init_args)?,
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> Result<()> {
    info!("Loading config from {:?}", args.config);
    let config = ServiceConfig::load(&args.config)
        .with_context(|| format!("failed to load config from {:?}", args.config))?;

    let public_bucket = {
        let mut bucket = S3Bucket::new(
            config.public_bucket.name.clone(),
            config.public_bucket.direct_host.clone(),
        );
        if let Some(host) = &config.public_bucket.cloudfront_host {
            bucket = bucket.with_cloudfront_host(host.clone());
        }
        bucket
    };
    let private_bucket = S3Bucket::new(
        config.private_bucket.name.clone(),
        config.private_bucket.direct_host.clone(),
    );
    let azure_container = BlobContainer::new(config.azure.container.clone(), config.azure.host.clone());
    let region_resolver = StaticRegionResolver::new(RegionTable::new(config.region_table.clone()));

    let service = Arc::new(ArtifactService {
        task_reader: Arc::new(InMemoryTaskReader::new()),
        store: Arc::new(artifact::store::InMemoryArtifactStore::new()),
        authorizer: Arc::new(AllowAllAuthorizer),
        publisher: Arc::new(TracingPublisher),
        region_resolver: Arc::new(region_resolver),
        public_bucket,
        private_bucket,
        azure_container,
        cloud_mirror_host: config.cloud_mirror_host.clone(),
        artifact_region: config.artifact_region.clone(),
    });

    web::start_server(&config.bind_addr, service).await
}

fn generate_sample_config(args: InitArgs) -> Result<()> {
    let config = ServiceConfig::sample();
    config.save(&args.output)?;
    println!("Generated sample config at: {:?}", args.output);
    Ok(())
}
