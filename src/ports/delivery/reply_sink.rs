use async_trait::async_trait;

use crate::domain::{errors::DeliveryResult, models::Reply};

/// Port for the message-emission side of the chat platform
#[async_trait]
pub trait ReplySink: Send + Sync + 'static {
    /// Deliver a reply; image files must be consumed before this returns
    async fn emit(&self, reply: Reply) -> DeliveryResult<()>;
}
