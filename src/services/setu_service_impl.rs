use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{DeliveryError, DeliveryResult, StorageResult},
        models::{ObjectEntry, Reply},
        value_objects::ObjectKey,
    },
    ports::{
        delivery::{ObjectFetcher, ReplySink},
        services::SetuService,
        storage::ObjectListing,
    },
    services::{random_object_selector::RandomObjectSelector, rng::SharedRng},
};

/// Text sent when the bucket holds no objects at all
pub const NOTHING_FOUND_MESSAGE: &str = "No files found in the bucket!";

/// Implementation of SetuService: random object in, image reply out
pub struct SetuServiceImpl {
    selector: RandomObjectSelector,
    fetcher: Arc<dyn ObjectFetcher>,
    sink: Arc<dyn ReplySink>,
    temp_dir: PathBuf,
    rng: SharedRng,
}

impl SetuServiceImpl {
    pub fn new(
        listing: Arc<dyn ObjectListing>,
        fetcher: Arc<dyn ObjectFetcher>,
        sink: Arc<dyn ReplySink>,
        temp_dir: PathBuf,
        rng: SharedRng,
    ) -> Self {
        Self {
            selector: RandomObjectSelector::new(listing),
            fetcher,
            sink,
            temp_dir,
            rng,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    async fn deliver_random_image(&self) -> DeliveryResult<()> {
        let Some(entry) = self.pick_random_object().await? else {
            return self.sink.emit(Reply::text(NOTHING_FOUND_MESSAGE)).await;
        };

        let bytes = self.fetcher.fetch(&entry.key).await?;
        let image = TempImage::create(&self.temp_dir, &entry.key, &bytes).await?;
        info!(key = %entry.key, path = %image.path().display(), size = bytes.len(), "download complete");

        let emitted = self
            .sink
            .emit(Reply::Image {
                key: entry.key,
                path: image.path().to_path_buf(),
            })
            .await;
        if let Err(err) = image.remove().await {
            warn!(error = %err, "failed to remove downloaded image");
        }

        emitted
    }
}

#[async_trait]
impl SetuService for SetuServiceImpl {
    async fn pick_random_object(&self) -> StorageResult<Option<ObjectEntry>> {
        let mut rng = self.rng.fork();
        self.selector.select_random_object(&mut rng).await
    }

    async fn handle_setu_command(&self) -> DeliveryResult<()> {
        let err = match self.deliver_random_image().await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        warn!(error = %err, "setu command failed");
        let message = match &err {
            DeliveryError::DownloadFailed { .. } => err.to_string(),
            _ => format!("An error occurred: {}", err),
        };
        self.sink.emit(Reply::Text(message)).await
    }
}

/// Downloaded image on local disk, removed on drop unless removed explicitly
struct TempImage {
    path: PathBuf,
    removed: bool,
}

impl TempImage {
    async fn create(dir: &Path, key: &ObjectKey, bytes: &[u8]) -> DeliveryResult<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let image = Self {
            path: dir.join(format!("{}-{}", Uuid::new_v4().simple(), key.file_name())),
            removed: false,
        };
        tokio::fs::write(&image.path, bytes).await?;
        Ok(image)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) -> DeliveryResult<()> {
        self.removed = true;
        tokio::fs::remove_file(&self.path).await?;
        Ok(())
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Builder for SetuServiceImpl
pub struct SetuServiceBuilder {
    listing: Option<Arc<dyn ObjectListing>>,
    fetcher: Option<Arc<dyn ObjectFetcher>>,
    sink: Option<Arc<dyn ReplySink>>,
    temp_dir: PathBuf,
    seed: Option<u64>,
}

impl SetuServiceBuilder {
    pub fn new() -> Self {
        Self {
            listing: None,
            fetcher: None,
            sink: None,
            temp_dir: std::env::temp_dir(),
            seed: None,
        }
    }

    pub fn listing(mut self, listing: Arc<dyn ObjectListing>) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ObjectFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<SetuServiceImpl, &'static str> {
        let listing = self.listing.ok_or("Listing is required")?;
        let fetcher = self.fetcher.ok_or("Fetcher is required")?;
        let sink = self.sink.ok_or("Sink is required")?;

        Ok(SetuServiceImpl::new(
            listing,
            fetcher,
            sink,
            self.temp_dir,
            SharedRng::new(self.seed),
        ))
    }
}

impl Default for SetuServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
