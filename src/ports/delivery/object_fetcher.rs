use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{errors::DeliveryResult, value_objects::ObjectKey};

/// Port for retrieving the bytes of a selected object
#[async_trait]
pub trait ObjectFetcher: Send + Sync + 'static {
    /// Resolve `key` to a fetchable location and download it
    async fn fetch(&self, key: &ObjectKey) -> DeliveryResult<Bytes>;
}
