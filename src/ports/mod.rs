pub mod delivery;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use delivery::{ObjectFetcher, ReplySink};
pub use services::SetuService;
pub use storage::{EntryStream, ObjectListing};
