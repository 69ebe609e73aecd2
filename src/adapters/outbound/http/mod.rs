mod http_object_fetcher;

pub use http_object_fetcher::HttpObjectFetcher;
