use futures::{future, stream::BoxStream, StreamExt};

use crate::domain::{
    errors::StorageResult,
    models::{ListingEntry, ObjectEntry, PrefixEntry},
};

/// Lazy, finite stream of listing results
///
/// Each call to a listing method starts a fresh, independent stream.
pub type EntryStream<T> = BoxStream<'static, StorageResult<T>>;

/// Port for paginated, hierarchical bucket listings
/// This abstracts the actual storage backend (S3, OSS, in-memory, etc.)
pub trait ObjectListing: Send + Sync + 'static {
    /// List one level deep: root objects and folder markers interleaved
    fn list_top_level(&self) -> EntryStream<ListingEntry>;

    /// List every object stored anywhere under `prefix`
    fn list_objects_under_prefix(&self, prefix: &PrefixEntry) -> EntryStream<ObjectEntry>;

    /// List every object in the bucket, flat
    fn list_all_objects(&self) -> EntryStream<ObjectEntry>;

    /// Folder markers of the top-level listing only
    fn list_top_level_prefixes(&self) -> EntryStream<PrefixEntry> {
        self.list_top_level()
            .filter_map(|entry| {
                future::ready(match entry {
                    Ok(entry) => entry.into_prefix().map(Ok),
                    Err(err) => Some(Err(err)),
                })
            })
            .boxed()
    }
}
