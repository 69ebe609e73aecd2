use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

use crate::{
    domain::{
        errors::{DeliveryError, DeliveryResult},
        value_objects::ObjectKey,
    },
    ports::delivery::ObjectFetcher,
};

/// Downloads objects through the bucket's (internal) HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpObjectFetcher {
    client: reqwest::Client,
    url_prefix: String,
}

impl HttpObjectFetcher {
    pub fn new(url_prefix: impl Into<String>) -> DeliveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DeliveryError::from)?;

        Ok(Self::with_client(client, url_prefix))
    }

    pub fn with_client(client: reqwest::Client, url_prefix: impl Into<String>) -> Self {
        Self {
            client,
            url_prefix: url_prefix.into(),
        }
    }

    /// `<url_prefix without trailing slashes>/<key>`
    pub fn object_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), key.as_str())
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => DeliveryError::DownloadFailed {
                status: status.as_u16(),
            },
            None => DeliveryError::Transport {
                message: err.to_string(),
            },
        }
    }
}

#[async_trait]
impl ObjectFetcher for HttpObjectFetcher {
    async fn fetch(&self, key: &ObjectKey) -> DeliveryResult<Bytes> {
        let url = self.object_url(key);
        debug!(%url, "downloading object");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::DownloadFailed {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}
