use futures::StreamExt;
use rand::{rngs::StdRng, SeedableRng};
use random_object_picker::{
    reservoir_sample, EntryStream, ListingEntry, ObjectEntry, ObjectKey, ObjectListing,
    PrefixEntry, RandomObjectSelector, StorageError,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Chi-square critical value for 5 degrees of freedom at p = 0.0001
const CHI_SQUARE_DF5: f64 = 25.74;

fn chi_square(counts: &[u64]) -> f64 {
    let trials: u64 = counts.iter().sum();
    let expected = trials as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Serve `keys` in pages of `page_size`, yielding to the runtime between pages
fn paged(keys: Vec<String>, page_size: usize, fail_after: Option<usize>) -> EntryStream<ObjectEntry> {
    async_stream::stream! {
        let mut yielded = 0;
        for page in keys.chunks(page_size.max(1)) {
            tokio::task::yield_now().await;
            for key in page {
                if fail_after == Some(yielded) {
                    yield Err(StorageError::ListingFailed {
                        prefix: None,
                        message: "connection reset by peer".to_string(),
                    });
                    return;
                }
                yielded += 1;
                yield Ok(ObjectEntry::new(ObjectKey::new(key.clone()).unwrap(), 1));
            }
        }
    }
    .boxed()
}

/// Paginated listing over a fixed key set
struct PagedListing {
    keys: Vec<String>,
    empty_folders: Vec<String>,
    page_size: usize,
    fail_after: Option<usize>,
    folder_listings: AtomicUsize,
    full_listings: AtomicUsize,
}

impl PagedListing {
    fn new(keys: &[&str], page_size: usize) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            empty_folders: Vec::new(),
            page_size,
            fail_after: None,
            folder_listings: AtomicUsize::new(0),
            full_listings: AtomicUsize::new(0),
        }
    }

    fn with_empty_folder(mut self, folder: &str) -> Self {
        self.empty_folders.push(folder.to_string());
        self
    }

    fn failing_after(mut self, entries: usize) -> Self {
        self.fail_after = Some(entries);
        self
    }
}

impl ObjectListing for PagedListing {
    fn list_top_level(&self) -> EntryStream<ListingEntry> {
        let mut folders: Vec<String> = self
            .keys
            .iter()
            .filter_map(|key| key.split_once('/').map(|(folder, _)| folder.to_string()))
            .chain(self.empty_folders.iter().cloned())
            .collect();
        folders.sort();
        folders.dedup();

        let roots: Vec<String> = self.keys.iter().filter(|k| !k.contains('/')).cloned().collect();
        let entries: Vec<Result<ListingEntry, StorageError>> = folders
            .into_iter()
            .map(|f| Ok(ListingEntry::Prefix(PrefixEntry::new(f).unwrap())))
            .chain(roots.into_iter().map(|k| {
                Ok(ListingEntry::Object(ObjectEntry::new(ObjectKey::new(k).unwrap(), 1)))
            }))
            .collect();
        futures::stream::iter(entries).boxed()
    }

    fn list_objects_under_prefix(&self, prefix: &PrefixEntry) -> EntryStream<ObjectEntry> {
        self.folder_listings.fetch_add(1, Ordering::SeqCst);
        let keys = self
            .keys
            .iter()
            .filter(|k| k.starts_with(prefix.as_str()))
            .cloned()
            .collect();
        paged(keys, self.page_size, self.fail_after)
    }

    fn list_all_objects(&self) -> EntryStream<ObjectEntry> {
        self.full_listings.fetch_add(1, Ordering::SeqCst);
        paged(self.keys.clone(), self.page_size, self.fail_after)
    }
}

fn six_keys() -> Vec<String> {
    (0..6).map(|i| format!("img-{}.png", i)).collect()
}

fn index_of(entry: &ObjectEntry) -> usize {
    entry
        .key
        .as_str()
        .trim_start_matches("img-")
        .trim_end_matches(".png")
        .parse()
        .unwrap()
}

#[tokio::test]
async fn sampling_is_uniform_for_every_page_size() {
    for page_size in [1, 2, 4, 6, 100] {
        let mut rng = StdRng::seed_from_u64(page_size as u64);
        let mut counts = [0u64; 6];

        for _ in 0..12_000 {
            let entry = reservoir_sample(paged(six_keys(), page_size, None), &mut rng)
                .await
                .unwrap()
                .unwrap();
            counts[index_of(&entry)] += 1;
        }

        assert!(
            chi_square(&counts) < CHI_SQUARE_DF5,
            "page size {} counts {:?}",
            page_size,
            counts
        );
    }
}

#[tokio::test]
async fn empty_and_singleton_streams_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(1);

    for page_size in [1, 3] {
        let none = reservoir_sample(paged(vec![], page_size, None), &mut rng).await;
        assert_eq!(none, Ok(None));

        let one = reservoir_sample(paged(vec!["only.png".to_string()], page_size, None), &mut rng)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(one.key.as_str(), "only.png");
    }
}

#[tokio::test]
async fn no_folders_samples_whole_bucket_uniformly() {
    let listing = Arc::new(PagedListing::new(&["o1.png", "o2.png", "o3.png"], 2));
    let selector = RandomObjectSelector::new(listing.clone());
    let mut rng = StdRng::seed_from_u64(2);
    let mut counts = [0u64; 3];

    for _ in 0..3_000 {
        let entry = selector.select_random_object(&mut rng).await.unwrap().unwrap();
        match entry.key.as_str() {
            "o1.png" => counts[0] += 1,
            "o2.png" => counts[1] += 1,
            "o3.png" => counts[2] += 1,
            other => panic!("unexpected key {}", other),
        }
    }

    assert_eq!(listing.folder_listings.load(Ordering::SeqCst), 0);
    for count in counts {
        assert!((800..=1_200).contains(&count), "{:?}", counts);
    }
}

#[tokio::test]
async fn empty_folder_falls_back_to_whole_bucket() {
    let listing = Arc::new(PagedListing::new(&["b/o.png"], 1).with_empty_folder("a"));
    let selector = RandomObjectSelector::new(listing.clone());
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..200 {
        let entry = selector.select_random_object(&mut rng).await.unwrap();
        assert_eq!(entry.unwrap().key.as_str(), "b/o.png");
    }

    // Folder `a` was drawn at least once and triggered the flat fallback.
    assert!(listing.full_listings.load(Ordering::SeqCst) > 0);
    assert_eq!(listing.folder_listings.load(Ordering::SeqCst), 200);
}

#[tokio::test]
async fn empty_folder_fallback_draws_from_every_folder_and_the_root() {
    let listing = Arc::new(
        PagedListing::new(&["b/o.png", "root1.png", "root2.png"], 1).with_empty_folder("a"),
    );
    let selector = RandomObjectSelector::new(listing.clone());
    let mut rng = StdRng::seed_from_u64(7);
    let mut counts = [0u64; 3];

    for _ in 0..3_000 {
        let entry = selector.select_random_object(&mut rng).await.unwrap().unwrap();
        match entry.key.as_str() {
            "b/o.png" => counts[0] += 1,
            "root1.png" => counts[1] += 1,
            "root2.png" => counts[2] += 1,
            other => panic!("unexpected key {}", other),
        }
    }

    // Half the draws pick `b` directly; the other half sample all three keys.
    assert!((1_850..=2_150).contains(&counts[0]), "{:?}", counts);
    assert!((400..=600).contains(&counts[1]), "{:?}", counts);
    assert!((400..=600).contains(&counts[2]), "{:?}", counts);
    let fallbacks = listing.full_listings.load(Ordering::SeqCst);
    assert!((1_350..=1_650).contains(&fallbacks), "{} fallbacks", fallbacks);
    assert_eq!(listing.folder_listings.load(Ordering::SeqCst), 3_000);
}

#[tokio::test]
async fn only_empty_folders_yields_none() {
    let listing = PagedListing::new(&[], 3)
        .with_empty_folder("a")
        .with_empty_folder("b");
    let selector = RandomObjectSelector::new(Arc::new(listing));
    let mut rng = StdRng::seed_from_u64(4);

    assert_eq!(selector.select_random_object(&mut rng).await.unwrap(), None);
}

#[tokio::test]
async fn objects_stay_inside_the_chosen_folder() {
    let listing = PagedListing::new(&["cats/1.png", "cats/2.png", "dogs/1.png", "root.png"], 1);
    let selector = RandomObjectSelector::new(Arc::new(listing));
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..200 {
        let entry = selector.select_random_object(&mut rng).await.unwrap().unwrap();
        // Root-level objects are only reachable through the flat fallback.
        assert_ne!(entry.key.as_str(), "root.png");
    }
}

#[tokio::test]
async fn mid_stream_failure_is_returned_not_a_partial_pick() {
    let listing = PagedListing::new(&["a.png", "b.png", "c.png", "d.png"], 2).failing_after(3);
    let selector = RandomObjectSelector::new(Arc::new(listing));
    let mut rng = StdRng::seed_from_u64(6);

    let err = selector.select_random_object(&mut rng).await.unwrap_err();
    assert_eq!(
        err,
        StorageError::ListingFailed {
            prefix: None,
            message: "connection reset by peer".to_string(),
        }
    );
}
