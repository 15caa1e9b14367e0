use crate::db::Repository;
use crate::error::Result;
use crate::feed::EntryFetcher;
use crate::models::{NewNewsItem, Source};

use super::KeywordMatcher;

/// Counters for one pass over every source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub sources: usize,
    pub skipped: usize,
    pub inserted: usize,
}

pub struct IngestLoop<F> {
    repository: Repository,
    fetcher: F,
}

impl<F: EntryFetcher> IngestLoop<F> {
    pub fn new(repository: Repository, fetcher: F) -> Self {
        Self {
            repository,
            fetcher,
        }
    }

    /// One pass: snapshot sources and keywords, then fetch, filter and store
    /// unseen matches. Each insert commits on its own; a feed that fails to
    /// load is skipped, a database error ends the pass.
    pub async fn run_pass(&self) -> Result<PassReport> {
        let sources = self.repository.list_sources().await?;
        let keywords = self.repository.list_keywords().await?;
        let matcher = KeywordMatcher::new(keywords.iter().map(|k| k.word.as_str()))?;

        tracing::info!("Starting to process sources: {} items", sources.len());
        if matcher.is_empty() {
            tracing::info!("No keywords configured, nothing will be stored this pass");
        }

        let mut report = PassReport {
            sources: sources.len(),
            ..Default::default()
        };

        for source in &sources {
            tracing::info!("Processing: {}", source.url);
            match self.process_source(source, &matcher).await? {
                Some(inserted) => report.inserted += inserted,
                None => report.skipped += 1,
            }
            tracing::info!("Processing completed for the source: {}", source.url);
        }

        Ok(report)
    }

    /// Returns the number of stored items, or `None` when the feed yielded nothing.
    async fn process_source(
        &self,
        source: &Source,
        matcher: &KeywordMatcher,
    ) -> Result<Option<usize>> {
        let entries = match self.fetcher.fetch_entries(&source.url).await {
            Ok(entries) if entries.is_empty() => {
                tracing::info!("No entries in {}", source.url);
                return Ok(None);
            }
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", source.url, e);
                return Ok(None);
            }
        };

        let mut inserted = 0;
        for entry in entries {
            if !matcher.matches(&entry.title, &entry.description) {
                continue;
            }
            if self.repository.link_exists(&entry.link).await? {
                tracing::debug!("Already stored: {}", entry.link);
                continue;
            }

            let title = entry.title;
            let link = entry.link;
            self.repository
                .insert_news_item(NewNewsItem {
                    title: title.clone(),
                    description: entry.description,
                    link: link.clone(),
                    source_id: source.id,
                })
                .await?;
            inserted += 1;
            tracing::info!("Added a news item: {} ({})", title, link);
        }

        Ok(Some(inserted))
    }
}
