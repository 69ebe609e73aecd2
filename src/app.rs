use object_store::{memory::InMemory, ObjectStore as ApacheObjectStore};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    adapters::outbound::{
        http::HttpObjectFetcher,
        sink::ConsoleSink,
        storage::{create_s3_store, ApacheObjectStoreAdapter, S3Config, DEFAULT_REGION},
    },
    ports::{
        delivery::{ObjectFetcher, ReplySink},
        storage::ObjectListing,
    },
    services::{SetuServiceBuilder, SetuServiceImpl},
};

/// Configuration for the application
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub image_source: ImageSource,
    pub temp_dir: PathBuf,
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory,
            image_source: ImageSource::Store,
            temp_dir: std::env::temp_dir(),
            seed: None,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    InMemory,
    S3(S3Config),
}

/// Where the bytes of a selected object are downloaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// `<prefix>/<key>` over HTTP, typically the bucket's internal endpoint
    UrlPrefix(String),
    /// Straight from the object store
    Store,
}

impl ImageSource {
    fn from_prefix(prefix: Option<String>) -> Self {
        match prefix {
            Some(prefix) if !prefix.trim().is_empty() => ImageSource::UrlPrefix(prefix),
            _ => ImageSource::Store,
        }
    }
}

/// Plugin configuration file (JSON)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PluginConfig {
    #[serde(alias = "oss_access_key_id")]
    pub access_key_id: Option<String>,
    #[serde(alias = "oss_access_key_secret")]
    pub access_key_secret: Option<String>,
    pub endpoint: Option<String>,
    /// Aliyun OSS endpoint; implies OSS addressing
    pub oss_endpoint: Option<String>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub virtual_hosted_style: bool,
    pub internal_url_prefix: Option<String>,
    pub temp_dir: Option<PathBuf>,
}

impl PluginConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Configuration {
            message: format!("Invalid plugin config: {}", e),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to read {}: {}", path.display(), e),
            })?;
        Self::from_json_str(&json)
    }

    /// A bucket name selects the S3 backend; without one the store is in-memory
    pub fn into_app_config(self) -> Result<AppConfig, AppError> {
        let oss = self.oss_endpoint.is_some();
        let endpoint = self.endpoint.or(self.oss_endpoint);

        let storage_backend = match self.bucket_name {
            Some(bucket) => {
                let allow_http = endpoint
                    .as_deref()
                    .is_some_and(|endpoint| endpoint.starts_with("http://"));
                let config = S3Config {
                    bucket,
                    region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
                    access_key: self.access_key_id,
                    secret_key: self.access_key_secret,
                    endpoint,
                    allow_http,
                    virtual_hosted_style: self.virtual_hosted_style,
                };
                StorageBackend::S3(with_oss_addressing(config, oss)?)
            }
            None if self.access_key_id.is_some() || endpoint.is_some() => {
                return Err(AppError::Configuration {
                    message: "bucket_name is required when credentials or an endpoint are set"
                        .to_string(),
                });
            }
            None => StorageBackend::InMemory,
        };

        Ok(AppConfig {
            storage_backend,
            image_source: ImageSource::from_prefix(self.internal_url_prefix),
            temp_dir: self.temp_dir.unwrap_or_else(std::env::temp_dir),
            seed: None,
        })
    }
}

/// Switch to OSS addressing when asked to or when the endpoint is an OSS host
pub fn with_oss_addressing(config: S3Config, oss: bool) -> Result<S3Config, AppError> {
    if !(oss || config.is_oss()) {
        return Ok(config);
    }
    config
        .with_oss_addressing()
        .map_err(|e| AppError::Configuration {
            message: format!("{:#}", e),
        })
}

impl AppConfig {
    /// Build configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| {
            lookup(name)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };

        let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
            Some(backend @ ("s3" | "oss")) => {
                let bucket = lookup("S3_BUCKET").ok_or_else(|| AppError::Configuration {
                    message: "S3_BUCKET environment variable required".to_string(),
                })?;
                let config = S3Config {
                    bucket,
                    region: lookup("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                    access_key: lookup("S3_ACCESS_KEY"),
                    secret_key: lookup("S3_SECRET_KEY"),
                    endpoint: lookup("S3_ENDPOINT"),
                    allow_http: flag("S3_ALLOW_HTTP"),
                    virtual_hosted_style: flag("S3_VIRTUAL_HOSTED_STYLE"),
                };
                StorageBackend::S3(with_oss_addressing(config, backend == "oss")?)
            }
            Some("memory") | None => StorageBackend::InMemory,
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown storage backend: {}", other),
                })
            }
        };

        let seed = match lookup("SETU_SEED") {
            Some(seed) => Some(seed.parse::<u64>().map_err(|e| AppError::Configuration {
                message: format!("SETU_SEED must be an unsigned integer: {}", e),
            })?),
            None => None,
        };

        Ok(AppConfig {
            storage_backend,
            image_source: ImageSource::from_prefix(lookup("IMAGE_URL_PREFIX")),
            temp_dir: lookup("SETU_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            seed,
        })
    }
}

/// Application services container
pub struct AppServices {
    pub setu_service: SetuServiceImpl,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    store: Option<Arc<dyn ApacheObjectStore>>,
    sink: Option<Arc<dyn ReplySink>>,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            sink: None,
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_image_source(mut self, source: ImageSource) -> Self {
        self.config.image_source = source;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = temp_dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Use an existing store instead of the configured backend
    pub fn with_store(mut self, store: Arc<dyn ApacheObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Where replies go; defaults to the console
    pub fn with_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let store = match self.store.clone() {
            Some(store) => store,
            None => self.create_store()?,
        };
        let adapter = Arc::new(ApacheObjectStoreAdapter::new(store));

        let fetcher: Arc<dyn ObjectFetcher> = match &self.config.image_source {
            ImageSource::UrlPrefix(prefix) => Arc::new(HttpObjectFetcher::new(prefix.clone()).map_err(
                |e| AppError::ServiceInit {
                    message: format!("Failed to create HTTP client: {}", e),
                },
            )?),
            ImageSource::Store => adapter.clone() as Arc<dyn ObjectFetcher>,
        };
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(ConsoleSink::default()));

        let setu_service = SetuServiceBuilder::new()
            .listing(adapter as Arc<dyn ObjectListing>)
            .fetcher(fetcher)
            .sink(sink)
            .temp_dir(self.config.temp_dir)
            .seed(self.config.seed)
            .build()
            .map_err(|e| AppError::ServiceInit {
                message: e.to_string(),
            })?;

        Ok(AppServices { setu_service })
    }

    /// Create the object store based on configuration
    fn create_store(&self) -> Result<Arc<dyn ApacheObjectStore>, AppError> {
        match &self.config.storage_backend {
            StorageBackend::InMemory => Ok(Arc::new(InMemory::new()) as Arc<dyn ApacheObjectStore>),
            StorageBackend::S3(config) => {
                create_s3_store(config).map_err(|e| AppError::StorageInit {
                    message: format!("{:#}", e),
                })
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Service initialization error: {message}")]
    ServiceInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .build()
        .await
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_config(AppConfig::from_env()?)
        .build()
        .await
}
