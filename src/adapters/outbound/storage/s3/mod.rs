//! S3-compatible store construction using the object_store crate
//!
//! Aliyun OSS, MinIO and AWS S3 all speak the S3 API; OSS additionally
//! requires virtual-hosted style requests against a bucket-qualified host.

use anyhow::{Context, Result};
use object_store::{aws::AmazonS3Builder, ObjectStore as ObjectStoreBackend};
use std::sync::Arc;
use url::Url;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

const OSS_DOMAIN: &str = "aliyuncs.com";

/// Configuration for an S3-compatible storage backend
#[derive(Debug, Clone, PartialEq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub allow_http: bool,
    pub virtual_hosted_style: bool,
}

impl S3Config {
    /// Whether the endpoint is an Aliyun OSS host
    pub fn is_oss(&self) -> bool {
        self.endpoint
            .as_deref()
            .and_then(|endpoint| parse_endpoint(endpoint).ok())
            .and_then(|url| url.host_str().map(|host| host.ends_with(OSS_DOMAIN)))
            .unwrap_or(false)
    }

    /// Rewrite the config for OSS: virtual-hosted requests sent to
    /// `<scheme>://<bucket>.<host>`.
    ///
    /// object_store uses a configured endpoint verbatim in virtual-hosted
    /// mode, so the bucket has to be part of it. A default region is
    /// replaced by the `oss-<region>` label of the endpoint host.
    pub fn with_oss_addressing(mut self) -> Result<Self> {
        let endpoint = self
            .endpoint
            .as_deref()
            .context("OSS needs an endpoint, e.g. https://oss-cn-hangzhou.aliyuncs.com")?;
        let mut url = parse_endpoint(endpoint)?;
        let host = url
            .host_str()
            .with_context(|| format!("OSS endpoint has no host: {}", endpoint))?
            .to_string();

        let bucket_label = format!("{}.", self.bucket);
        let region_host = if host.starts_with(&bucket_label) {
            host[bucket_label.len()..].to_string()
        } else {
            url.set_host(Some(&format!("{}{}", bucket_label, host)))
                .with_context(|| format!("Invalid OSS bucket host for {}", self.bucket))?;
            host
        };

        if self.region == DEFAULT_REGION {
            if let Some(label) = region_host.split('.').next().filter(|l| l.starts_with("oss-")) {
                self.region = label.trim_end_matches("-internal").to_string();
            }
        }

        self.allow_http = self.allow_http || url.scheme() == "http";
        self.endpoint = Some(url.as_str().trim_end_matches('/').to_string());
        self.virtual_hosted_style = true;
        Ok(self)
    }
}

/// Endpoints without a scheme are taken as https
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let endpoint = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };
    Url::parse(&endpoint).with_context(|| format!("Invalid endpoint: {}", endpoint))
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStoreBackend>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http)
        .with_virtual_hosted_style_request(config.virtual_hosted_style);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    let store = builder.build().context("Failed to build S3 store")?;

    Ok(Arc::new(store))
}
