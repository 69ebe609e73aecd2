use async_trait::async_trait;

use crate::domain::{
    errors::{DeliveryResult, StorageResult},
    models::ObjectEntry,
};

/// Port for the random-image command
#[async_trait]
pub trait SetuService: Send + Sync + 'static {
    /// Pick a random object without downloading it
    async fn pick_random_object(&self) -> StorageResult<Option<ObjectEntry>>;

    /// Run the full command: pick, download, emit, clean up
    ///
    /// Failures are reported to the sink as text; only a failing sink
    /// surfaces as an error here.
    async fn handle_setu_command(&self) -> DeliveryResult<()>;
}
