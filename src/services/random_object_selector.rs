use futures::TryStreamExt;
use rand::{seq::SliceRandom, Rng};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::StorageResult,
        models::{ObjectEntry, PrefixEntry},
    },
    ports::storage::ObjectListing,
    services::sampling::reservoir_sample,
};

/// Picks one object uniformly at random from a folder-structured bucket
///
/// A top-level folder is chosen first, then an object inside it by reservoir
/// sampling. Buckets without folders, and folders that turn out empty, are
/// sampled as one flat listing instead.
#[derive(Clone)]
pub struct RandomObjectSelector {
    listing: Arc<dyn ObjectListing>,
}

impl RandomObjectSelector {
    pub fn new(listing: Arc<dyn ObjectListing>) -> Self {
        Self { listing }
    }

    pub async fn select_random_object<R>(&self, rng: &mut R) -> StorageResult<Option<ObjectEntry>>
    where
        R: Rng + Send + ?Sized,
    {
        // Folder count is small next to object count, so this one is drained.
        let prefixes: Vec<PrefixEntry> = self.listing.list_top_level_prefixes().try_collect().await?;

        let Some(prefix) = prefixes.choose(&mut *rng).cloned() else {
            debug!("no top-level folders, sampling the whole bucket");
            return self.select_from_whole_bucket(rng).await;
        };
        debug!(folders = prefixes.len(), %prefix, "picked folder");

        let picked = reservoir_sample(self.listing.list_objects_under_prefix(&prefix), &mut *rng).await?;
        match picked {
            Some(entry) => {
                info!(key = %entry.key, %prefix, "selected random object");
                Ok(Some(entry))
            }
            None => {
                debug!(%prefix, "folder is empty, sampling the whole bucket");
                self.select_from_whole_bucket(rng).await
            }
        }
    }

    async fn select_from_whole_bucket<R>(&self, rng: &mut R) -> StorageResult<Option<ObjectEntry>>
    where
        R: Rng + Send + ?Sized,
    {
        let picked = reservoir_sample(self.listing.list_all_objects(), &mut *rng).await?;
        match &picked {
            Some(entry) => info!(key = %entry.key, "selected random object from whole bucket"),
            None => info!("bucket is empty"),
        }
        Ok(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{errors::StorageError, models::ListingEntry, value_objects::ObjectKey},
        ports::storage::EntryStream,
    };
    use futures::{stream, StreamExt};
    use rand::{rngs::StdRng, SeedableRng};
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Listing over a fixed set of keys, folders derived from the first segment
    struct FixtureListing {
        keys: Vec<&'static str>,
        extra_folders: Vec<&'static str>,
        folder_listings: AtomicUsize,
    }

    impl FixtureListing {
        fn new(keys: Vec<&'static str>) -> Self {
            Self {
                keys,
                extra_folders: Vec::new(),
                folder_listings: AtomicUsize::new(0),
            }
        }

        fn with_empty_folder(mut self, folder: &'static str) -> Self {
            self.extra_folders.push(folder);
            self
        }

        fn entry(key: &str) -> ObjectEntry {
            ObjectEntry::new(ObjectKey::try_from(key).unwrap(), 1)
        }
    }

    impl ObjectListing for FixtureListing {
        fn list_top_level(&self) -> EntryStream<ListingEntry> {
            let mut folders: Vec<String> = self
                .keys
                .iter()
                .filter_map(|key| key.split_once('/').map(|(folder, _)| folder.to_string()))
                .chain(self.extra_folders.iter().map(|f| f.to_string()))
                .collect();
            folders.sort();
            folders.dedup();

            let entries: Vec<StorageResult<ListingEntry>> = folders
                .into_iter()
                .map(|folder| Ok(ListingEntry::Prefix(PrefixEntry::new(folder).unwrap())))
                .chain(
                    self.keys
                        .iter()
                        .filter(|key| !key.contains('/'))
                        .map(|key| Ok(ListingEntry::Object(Self::entry(key)))),
                )
                .collect();
            stream::iter(entries).boxed()
        }

        fn list_objects_under_prefix(&self, prefix: &PrefixEntry) -> EntryStream<ObjectEntry> {
            self.folder_listings.fetch_add(1, Ordering::SeqCst);
            let entries: Vec<StorageResult<ObjectEntry>> = self
                .keys
                .iter()
                .filter(|key| key.starts_with(prefix.as_str()))
                .map(|key| Ok(Self::entry(key)))
                .collect();
            stream::iter(entries).boxed()
        }

        fn list_all_objects(&self) -> EntryStream<ObjectEntry> {
            let entries: Vec<StorageResult<ObjectEntry>> =
                self.keys.iter().map(|key| Ok(Self::entry(key))).collect();
            stream::iter(entries).boxed()
        }
    }

    struct FailingListing;

    impl ObjectListing for FailingListing {
        fn list_top_level(&self) -> EntryStream<ListingEntry> {
            stream::iter(vec![Ok(ListingEntry::Prefix(PrefixEntry::new("cats").unwrap()))]).boxed()
        }

        fn list_objects_under_prefix(&self, prefix: &PrefixEntry) -> EntryStream<ObjectEntry> {
            let failure = StorageError::ListingFailed {
                prefix: Some(prefix.to_string()),
                message: "connection reset".to_string(),
            };
            stream::iter(vec![
                Ok(FixtureListing::entry("cats/a.png")),
                Err(failure),
                Ok(FixtureListing::entry("cats/b.png")),
            ])
            .boxed()
        }

        fn list_all_objects(&self) -> EntryStream<ObjectEntry> {
            stream::iter(vec![Ok(FixtureListing::entry("cats/a.png"))]).boxed()
        }
    }

    #[tokio::test]
    async fn test_empty_bucket_returns_none() {
        let selector = RandomObjectSelector::new(Arc::new(FixtureListing::new(vec![])));
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(selector.select_random_object(&mut rng).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_single_object_always_selected() {
        let selector = RandomObjectSelector::new(Arc::new(FixtureListing::new(vec!["cats/a.png"])));
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..20 {
            let entry = selector.select_random_object(&mut rng).await.unwrap().unwrap();
            assert_eq!(entry.key.as_str(), "cats/a.png");
        }
    }

    #[tokio::test]
    async fn test_no_folders_never_lists_a_folder() {
        let listing = Arc::new(FixtureListing::new(vec!["o1.png", "o2.png", "o3.png"]));
        let selector = RandomObjectSelector::new(listing.clone());
        let mut rng = StdRng::seed_from_u64(3);
        let mut counts: HashMap<String, u32> = HashMap::new();

        for _ in 0..3_000 {
            let entry = selector.select_random_object(&mut rng).await.unwrap().unwrap();
            *counts.entry(entry.key.to_string()).or_default() += 1;
        }

        assert_eq!(listing.folder_listings.load(Ordering::SeqCst), 0);
        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            assert!((800..=1200).contains(count), "{:?}", counts);
        }
    }

    #[tokio::test]
    async fn test_empty_folder_falls_back_to_whole_bucket() {
        let listing = FixtureListing::new(vec!["b/o.png"]).with_empty_folder("a");
        let selector = RandomObjectSelector::new(Arc::new(listing));
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..50 {
            let entry = selector.select_random_object(&mut rng).await.unwrap();
            assert_eq!(entry.unwrap().key.as_str(), "b/o.png");
        }
    }

    #[tokio::test]
    async fn test_folder_is_chosen_before_object() {
        // One folder holds nine objects, the other one; folders are equally likely.
        let mut keys = vec!["small/only.png"];
        keys.extend([
            "big/1.png", "big/2.png", "big/3.png", "big/4.png", "big/5.png", "big/6.png",
            "big/7.png", "big/8.png", "big/9.png",
        ]);
        let selector = RandomObjectSelector::new(Arc::new(FixtureListing::new(keys)));
        let mut rng = StdRng::seed_from_u64(5);

        let trials = 4_000;
        let mut small = 0;
        for _ in 0..trials {
            let entry = selector.select_random_object(&mut rng).await.unwrap().unwrap();
            if entry.key.has_prefix("small/") {
                small += 1;
            }
        }

        assert!((1_800..=2_200).contains(&small), "small folder picked {} times", small);
    }

    #[tokio::test]
    async fn test_listing_error_is_surfaced() {
        let selector = RandomObjectSelector::new(Arc::new(FailingListing));
        let mut rng = StdRng::seed_from_u64(6);

        let err = selector.select_random_object(&mut rng).await.unwrap_err();
        assert!(matches!(err, StorageError::ListingFailed { .. }));
    }
}
