mod object_fetcher;
mod reply_sink;

pub use object_fetcher::ObjectFetcher;
pub use reply_sink::ReplySink;
