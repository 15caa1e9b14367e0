mod ingest;
mod matcher;

pub use ingest::IngestLoop;
pub use matcher::KeywordMatcher;
