mod keyword;
mod news;
mod source;

pub use keyword::Keyword;
pub use news::{NewNewsItem, NewsItem};
pub use source::{NewSource, Source};

/// Result of an idempotent create on a unique column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    AlreadyExists,
}
