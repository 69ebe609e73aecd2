pub mod entry;
pub mod reply;

pub use entry::*;
pub use reply::*;
