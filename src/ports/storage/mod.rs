mod object_listing;

pub use object_listing::{EntryStream, ObjectListing};
