use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::{
    domain::{
        errors::{DeliveryError, DeliveryResult},
        models::Reply,
    },
    ports::delivery::ReplySink,
};

/// Terminal stand-in for a chat channel
///
/// Text replies go to stdout. Images are copied into `output_dir` when one is
/// configured, since the downloaded file is removed right after emission.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    output_dir: Option<PathBuf>,
}

impl ConsoleSink {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn emit(&self, reply: Reply) -> DeliveryResult<()> {
        match reply {
            Reply::Text(message) => {
                println!("{}", message);
            }
            Reply::Image { key, path } => {
                let Some(output_dir) = &self.output_dir else {
                    let size = tokio::fs::metadata(&path).await?.len();
                    println!("[image] {} ({} bytes)", key, size);
                    return Ok(());
                };

                tokio::fs::create_dir_all(output_dir).await?;
                let target = output_dir.join(key.file_name());
                tokio::fs::copy(&path, &target)
                    .await
                    .map_err(|e| DeliveryError::Sink {
                        message: format!("failed to copy {} to {}: {}", key, target.display(), e),
                    })?;
                info!(%key, target = %target.display(), "image saved");
                println!("[image] {} -> {}", key, target.display());
            }
        }
        Ok(())
    }
}
