use std::future::Future;
use std::time::Duration;

use feed_rs::model::Link;
use feed_rs::parser;
use reqwest::Client;

use crate::error::Result;

/// The three fields the monitor cares about. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub link: String,
}

/// Anything that can turn a feed URL into its current entries.
pub trait EntryFetcher: Send + Sync {
    fn fetch_entries(&self, url: &str) -> impl Future<Output = Result<Vec<FeedEntry>>> + Send;
}

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("news-monitor/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl EntryFetcher for FeedFetcher {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        parse_entries(&bytes, Some(url))
    }
}

/// Parse an RSS, Atom or JSON feed document into entries. Relative links are
/// resolved against `base_uri` when given.
pub fn parse_entries(body: &[u8], base_uri: Option<&str>) -> Result<Vec<FeedEntry>> {
    let feed = parser::Builder::new().base_uri(base_uri).build().parse(body)?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            description: entry.summary.map(|s| s.content).unwrap_or_default(),
            link: entry_link(&entry.links),
        })
        .collect();

    Ok(entries)
}

/// The article link: first `alternate` (or rel-less) link, else the first link.
fn entry_link(links: &[Link]) -> String {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default()
}
