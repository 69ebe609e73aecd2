mod random_object_selector;
mod rng;
mod sampling;
mod setu_service_impl;

pub use random_object_selector::RandomObjectSelector;
pub use rng::SharedRng;
pub use sampling::{reservoir_sample, reservoir_sample_iter, Reservoir};
pub use setu_service_impl::{SetuServiceBuilder, SetuServiceImpl, NOTHING_FOUND_MESSAGE};
