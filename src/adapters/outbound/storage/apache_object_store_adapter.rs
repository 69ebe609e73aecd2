use async_trait::async_trait;
use bytes::Bytes;
use futures::{future, stream, stream::BoxStream, StreamExt};
use object_store::{path::Path as ObjectPath, ObjectMeta, ObjectStore as ApacheObjectStore};
use std::{collections::HashSet, sync::Arc};
use tracing::debug;

use crate::{
    adapters::outbound::storage::error::listing_error,
    domain::{
        errors::{DeliveryResult, StorageError, StorageResult},
        models::{ListingEntry, ObjectEntry, PrefixEntry},
        value_objects::ObjectKey,
    },
    ports::{
        delivery::ObjectFetcher,
        storage::{EntryStream, ObjectListing},
    },
};

/// Adapter that implements our listing and fetch ports using Apache object_store
#[derive(Clone)]
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
}

impl ApacheObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self { inner: store }
    }

    /// Stream the objects below `prefix` (or the whole store) as domain entries
    fn list_entries(&self, prefix: Option<&PrefixEntry>) -> EntryStream<ObjectEntry> {
        let prefix_str = prefix.map(|p| p.as_str().to_string());
        let prefix_path = match prefix.map(|p| store_path(p.folder())).transpose() {
            Ok(path) => path,
            Err(e) => return stream::iter(vec![Err(e)]).boxed(),
        };

        self.inner
            .list(prefix_path.as_ref())
            .map(move |result| match result {
                Ok(meta) => object_entry(meta),
                Err(e) => Err(listing_error(prefix_str.as_deref(), e)),
            })
            .boxed()
    }
}

/// Parse a key or folder that the listing already reported in encoded form
fn store_path(encoded: &str) -> StorageResult<ObjectPath> {
    ObjectPath::parse(encoded).map_err(|e| StorageError::ValidationError {
        message: format!("Invalid store path '{}': {}", encoded, e),
    })
}

fn object_entry(meta: ObjectMeta) -> StorageResult<ObjectEntry> {
    let key = ObjectKey::new(meta.location.to_string()).map_err(|e| {
        StorageError::ValidationError {
            message: format!("Invalid object key from store: {}", e),
        }
    })?;
    Ok(ObjectEntry::new(key, meta.size))
}

/// Fold a flat recursive listing into root objects and first-level folders
///
/// Only the names of folders already reported are kept, so memory grows with
/// the folder count and never with the object count.
fn top_level_entries(
    listing: BoxStream<'static, object_store::Result<ObjectMeta>>,
) -> EntryStream<ListingEntry> {
    let mut folders: HashSet<String> = HashSet::new();

    listing
        .filter_map(move |result| {
            let entry = match result {
                Ok(meta) => {
                    let (first, nested) = {
                        let mut parts = meta.location.parts();
                        let first =
                            parts.next().map(|part| AsRef::<str>::as_ref(&part).to_string());
                        let nested = parts.next().is_some();
                        (first, nested)
                    };
                    match first {
                        Some(folder) if nested => {
                            if folders.insert(folder.clone()) {
                                Some(PrefixEntry::new(folder).map(ListingEntry::Prefix).map_err(
                                    |e| StorageError::ValidationError {
                                        message: format!("Invalid folder prefix from store: {}", e),
                                    },
                                ))
                            } else {
                                None
                            }
                        }
                        _ => Some(object_entry(meta).map(ListingEntry::Object)),
                    }
                }
                Err(e) => Some(Err(listing_error(None, e))),
            };
            future::ready(entry)
        })
        .boxed()
}

impl ObjectListing for ApacheObjectStoreAdapter {
    fn list_top_level(&self) -> EntryStream<ListingEntry> {
        debug!("listing bucket root");
        top_level_entries(self.inner.list(None))
    }

    fn list_objects_under_prefix(&self, prefix: &PrefixEntry) -> EntryStream<ObjectEntry> {
        self.list_entries(Some(prefix))
    }

    fn list_all_objects(&self) -> EntryStream<ObjectEntry> {
        self.list_entries(None)
    }
}

/// Reads object bytes straight from the store, for buckets without a public URL
#[async_trait]
impl ObjectFetcher for ApacheObjectStoreAdapter {
    async fn fetch(&self, key: &ObjectKey) -> DeliveryResult<Bytes> {
        let path = store_path(key.as_str())?;

        let result = self.inner.get(&path).await.map_err(StorageError::from)?;
        let bytes = result.bytes().await.map_err(StorageError::from)?;

        Ok(bytes)
    }
}
