use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use random_object_picker::{
    app::{with_oss_addressing, AppBuilder, AppConfig, ImageSource, PluginConfig, StorageBackend},
    ConsoleSink, S3Config, SetuService, NOTHING_FOUND_MESSAGE,
};
use std::{path::PathBuf, str::FromStr, sync::Arc};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "setu")]
#[command(about = "Post a random image from an object-storage bucket", long_about = None)]
struct Cli {
    /// JSON plugin configuration file (replaces the storage flags below)
    #[arg(short, long, env = "SETU_CONFIG")]
    config: Option<PathBuf>,

    /// Storage backend type
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// S3-compatible endpoint URL (OSS, MinIO, ...)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// Bucket region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// Access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// Secret key
    #[arg(long, env = "S3_SECRET_KEY")]
    s3_secret_key: Option<String>,

    /// Allow plain HTTP endpoints
    #[arg(long, env = "S3_ALLOW_HTTP", default_value = "false")]
    s3_allow_http: bool,

    /// Use virtual-hosted style requests (required by Aliyun OSS)
    #[arg(long, env = "S3_VIRTUAL_HOSTED_STYLE", default_value = "false")]
    s3_virtual_hosted_style: bool,

    /// Download images from `<prefix>/<key>` instead of the store itself
    #[arg(long, env = "IMAGE_URL_PREFIX")]
    url_prefix: Option<String>,

    /// Directory for downloaded images (removed after sending)
    #[arg(long, env = "SETU_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Seed for reproducible picks
    #[arg(long, env = "SETU_SEED")]
    seed: Option<u64>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the key of a random object
    Pick,

    /// Download a random image and post it to the console
    Send {
        /// Keep delivered images in this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

impl Cli {
    fn storage_backend(&self) -> Result<StorageBackend> {
        match self.storage_backend.as_str() {
            "memory" => Ok(StorageBackend::InMemory),
            "s3" | "oss" => {
                let bucket = self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for S3 backend")?;

                let config = S3Config {
                    bucket,
                    region: self.s3_region.clone(),
                    access_key: self.s3_access_key.clone(),
                    secret_key: self.s3_secret_key.clone(),
                    endpoint: self.s3_endpoint.clone(),
                    allow_http: self.s3_allow_http,
                    virtual_hosted_style: self.s3_virtual_hosted_style,
                };
                let oss = self.storage_backend == "oss";
                Ok(StorageBackend::S3(with_oss_addressing(config, oss)?))
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        }
    }

    async fn to_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => PluginConfig::load(path).await?.into_app_config()?,
            None => AppConfig {
                storage_backend: self.storage_backend()?,
                ..AppConfig::default()
            },
        };

        if let Some(prefix) = &self.url_prefix {
            config.image_source = ImageSource::UrlPrefix(prefix.clone());
        }
        if let Some(temp_dir) = &self.temp_dir {
            config.temp_dir = temp_dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }

    fn init_logging(&self) -> Result<()> {
        let level = Level::from_str(&self.log_level).unwrap_or(Level::INFO);

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    let config = cli.to_app_config().await?;
    info!(backend = ?config.storage_backend, source = ?config.image_source, "starting setu");

    let output_dir = match &cli.command {
        Commands::Send { output_dir } => output_dir.clone(),
        Commands::Pick => None,
    };

    let services = AppBuilder::new()
        .with_config(config)
        .with_sink(Arc::new(ConsoleSink::new(output_dir)))
        .build()
        .await
        .context("Failed to build application")?;

    match cli.command {
        Commands::Pick => {
            match services
                .setu_service
                .pick_random_object()
                .await
                .context("Failed to pick a random object")?
            {
                Some(entry) => println!("{}", entry.key),
                None => println!("{}", NOTHING_FOUND_MESSAGE),
            }
        }
        Commands::Send { .. } => {
            services
                .setu_service
                .handle_setu_command()
                .await
                .context("Failed to deliver reply")?;
        }
    }

    Ok(())
}
