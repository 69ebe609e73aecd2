pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - entries, replies and errors
pub use domain::{
    DeliveryError,
    ListingEntry,
    ObjectEntry,
    // Value objects
    ObjectKey,
    PrefixEntry,
    Reply,
    // Errors
    StorageError,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{EntryStream, ObjectFetcher, ObjectListing, ReplySink, SetuService};

// Service implementations - sampling and delivery
pub use services::{
    reservoir_sample, reservoir_sample_iter, RandomObjectSelector, Reservoir, SetuServiceBuilder,
    SetuServiceImpl, SharedRng, NOTHING_FOUND_MESSAGE,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, AppBuilder, AppConfig, AppError, AppServices,
    ImageSource, PluginConfig, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    http::HttpObjectFetcher,
    sink::ConsoleSink,
    storage::{ApacheObjectStoreAdapter, S3Config},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_app_from_env, create_in_memory_app, ApacheObjectStoreAdapter, AppBuilder,
        AppServices, ObjectEntry, ObjectKey, ObjectListing, RandomObjectSelector, Reply,
        ReplySink, SetuService, SharedRng,
    };
}
