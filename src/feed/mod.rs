mod fetcher;

pub use fetcher::{EntryFetcher, FeedEntry, FeedFetcher};
