//! Single-item reservoir sampling.
//!
//! Picks one element uniformly at random from a sequence of unknown length
//! while holding only the current candidate and a running count.

use futures::{Stream, StreamExt};
use rand::Rng;

/// Running state of a size-one reservoir
#[derive(Debug)]
pub struct Reservoir<T> {
    chosen: Option<T>,
    seen: u64,
}

impl<T> Reservoir<T> {
    pub fn new() -> Self {
        Self {
            chosen: None,
            seen: 0,
        }
    }

    /// Offer the next element; it replaces the candidate with probability `1/seen`
    pub fn offer<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        if rng.gen_range(0..self.seen) == 0 {
            self.chosen = Some(item);
        }
    }

    /// Number of elements offered so far
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn into_chosen(self) -> Option<T> {
        self.chosen
    }
}

impl<T> Default for Reservoir<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample one element of an in-memory or lazily generated iterator
pub fn reservoir_sample_iter<T, I, R>(items: I, rng: &mut R) -> Option<T>
where
    I: IntoIterator<Item = T>,
    R: Rng + ?Sized,
{
    let mut reservoir = Reservoir::new();
    for item in items {
        reservoir.offer(item, rng);
    }
    reservoir.into_chosen()
}

/// Sample one element of a fallible stream
///
/// The first error stops consumption and is returned unchanged; a partially
/// sampled candidate is never returned.
pub async fn reservoir_sample<T, E, S, R>(stream: S, rng: &mut R) -> Result<Option<T>, E>
where
    S: Stream<Item = Result<T, E>>,
    R: Rng + ?Sized,
{
    futures::pin_mut!(stream);
    let mut reservoir = Reservoir::new();
    while let Some(item) = stream.next().await {
        reservoir.offer(item?, rng);
    }
    Ok(reservoir.into_chosen())
}
