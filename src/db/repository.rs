use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{InsertOutcome, Keyword, NewNewsItem, NewSource, NewsItem, Source};

use super::schema::SCHEMA;

/// SQLite-backed store. Every operation opens its own connection and drops it
/// when the operation returns, so nothing holds the database between calls.
#[derive(Debug, Clone)]
pub struct Repository {
    db_path: PathBuf,
}

impl Repository {
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let repo = Self {
            db_path: db_path.as_ref().to_path_buf(),
        };

        let conn = repo.connect().await?;
        conn.call(|conn| {
            // WAL lets the ingest pass and web requests interleave
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(repo)
    }

    async fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path).await?;
        conn.call(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            // news rows outlive their source
            conn.pragma_update(None, "foreign_keys", false)?;
            Ok(())
        })
        .await?;
        Ok(conn)
    }

    // Source operations

    pub async fn list_sources(&self) -> Result<Vec<Source>> {
        let conn = self.connect().await?;
        let sources = conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT id, name, url FROM sources ORDER BY id")?;
                let sources = stmt
                    .query_map([], source_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(sources)
            })
            .await?;
        Ok(sources)
    }

    pub async fn insert_source(&self, source: NewSource) -> Result<InsertOutcome> {
        let conn = self.connect().await?;
        let outcome = conn
            .call(move |conn| {
                let changed = conn.execute(
                    "INSERT INTO sources (name, url) VALUES (?1, ?2) ON CONFLICT(url) DO NOTHING",
                    params![source.name, source.url],
                )?;
                Ok(outcome_of(changed, conn.last_insert_rowid()))
            })
            .await?;
        Ok(outcome)
    }

    pub async fn delete_source(&self, id: i64) -> Result<usize> {
        let conn = self.connect().await?;
        let deleted = conn
            .call(move |conn| Ok(conn.execute("DELETE FROM sources WHERE id = ?1", params![id])?))
            .await?;
        Ok(deleted)
    }

    pub async fn delete_all_sources(&self) -> Result<usize> {
        let conn = self.connect().await?;
        let deleted = conn
            .call(|conn| Ok(conn.execute("DELETE FROM sources", [])?))
            .await?;
        Ok(deleted)
    }

    // Keyword operations

    pub async fn list_keywords(&self) -> Result<Vec<Keyword>> {
        let conn = self.connect().await?;
        let keywords = conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT id, word FROM keywords ORDER BY id")?;
                let keywords = stmt
                    .query_map([], keyword_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(keywords)
            })
            .await?;
        Ok(keywords)
    }

    pub async fn insert_keyword(&self, word: &str) -> Result<InsertOutcome> {
        let word = word.to_string();
        let conn = self.connect().await?;
        let outcome = conn
            .call(move |conn| {
                let changed = conn.execute(
                    "INSERT INTO keywords (word) VALUES (?1) ON CONFLICT(word) DO NOTHING",
                    params![word],
                )?;
                Ok(outcome_of(changed, conn.last_insert_rowid()))
            })
            .await?;
        Ok(outcome)
    }

    pub async fn delete_keyword(&self, id: i64) -> Result<usize> {
        let conn = self.connect().await?;
        let deleted = conn
            .call(move |conn| {
                Ok(conn.execute("DELETE FROM keywords WHERE id = ?1", params![id])?)
            })
            .await?;
        Ok(deleted)
    }

    pub async fn delete_all_keywords(&self) -> Result<usize> {
        let conn = self.connect().await?;
        let deleted = conn
            .call(|conn| Ok(conn.execute("DELETE FROM keywords", [])?))
            .await?;
        Ok(deleted)
    }

    // News operations

    pub async fn list_news(&self) -> Result<Vec<NewsItem>> {
        let conn = self.connect().await?;
        let news = conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, description, link, source_id, date_added FROM news ORDER BY id",
                )?;
                let news = stmt
                    .query_map([], news_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(news)
            })
            .await?;
        Ok(news)
    }

    /// Exact, case-sensitive comparison against stored links.
    pub async fn link_exists(&self, link: &str) -> Result<bool> {
        let link = link.to_string();
        let conn = self.connect().await?;
        let exists = conn
            .call(move |conn| {
                let found = conn
                    .query_row(
                        "SELECT 1 FROM news WHERE link = ?1 LIMIT 1",
                        params![link],
                        |_| Ok(()),
                    )
                    .optional()?;
                Ok(found.is_some())
            })
            .await?;
        Ok(exists)
    }

    pub async fn insert_news_item(&self, item: NewNewsItem) -> Result<i64> {
        let conn = self.connect().await?;
        let id = conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO news (title, description, link, source_id) VALUES (?1, ?2, ?3, ?4)",
                    params![item.title, item.description, item.link, item.source_id],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn delete_all_news(&self) -> Result<usize> {
        let conn = self.connect().await?;
        let deleted = conn
            .call(|conn| Ok(conn.execute("DELETE FROM news", [])?))
            .await?;
        Ok(deleted)
    }
}

fn outcome_of(changed: usize, rowid: i64) -> InsertOutcome {
    if changed == 0 {
        InsertOutcome::AlreadyExists
    } else {
        InsertOutcome::Inserted(rowid)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn source_from_row(row: &Row) -> rusqlite::Result<Source> {
    Ok(Source {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
    })
}

fn keyword_from_row(row: &Row) -> rusqlite::Result<Keyword> {
    Ok(Keyword {
        id: row.get(0)?,
        word: row.get(1)?,
    })
}

fn news_from_row(row: &Row) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        link: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        source_id: row.get(4)?,
        date_added: row
            .get::<_, String>(5)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    struct TestRepo {
        repo: Repository,
        _tmpdir: TempDir,
    }

    async fn test_repo() -> TestRepo {
        let tmpdir = tempfile::tempdir().unwrap();
        let db_path = tmpdir.path().join("test.db");
        let repo = Repository::new(&db_path).await.unwrap();
        TestRepo {
            repo,
            _tmpdir: tmpdir,
        }
    }

    fn news(link: &str, source_id: i64) -> NewNewsItem {
        NewNewsItem {
            title: "Title".into(),
            description: "Body".into(),
            link: link.into(),
            source_id,
        }
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let test = test_repo().await;
        test.repo.insert_keyword("rust").await.unwrap();

        let reopened = Repository::new(&test.repo.db_path).await.unwrap();
        assert_eq!(reopened.list_keywords().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_source_url_is_a_no_op() {
        let test = test_repo().await;
        let repo = &test.repo;

        let first = repo
            .insert_source(NewSource {
                name: Some("First".into()),
                url: "https://example.com/rss".into(),
            })
            .await
            .unwrap();
        let second = repo
            .insert_source(NewSource {
                name: Some("Second".into()),
                url: "https://example.com/rss".into(),
            })
            .await
            .unwrap();

        assert!(matches!(first, InsertOutcome::Inserted(_)));
        assert_eq!(second, InsertOutcome::AlreadyExists);

        let sources = repo.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn duplicate_keyword_is_a_no_op() {
        let test = test_repo().await;
        let repo = &test.repo;

        assert!(matches!(
            repo.insert_keyword("launch").await.unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert_eq!(
            repo.insert_keyword("launch").await.unwrap(),
            InsertOutcome::AlreadyExists
        );

        let keywords = repo.list_keywords().await.unwrap();
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].word, "launch");
    }

    #[tokio::test]
    async fn link_exists_is_exact_and_case_sensitive() {
        let test = test_repo().await;
        let repo = &test.repo;

        repo.insert_news_item(news("https://example.com/a", 1))
            .await
            .unwrap();

        assert!(repo.link_exists("https://example.com/a").await.unwrap());
        assert!(!repo.link_exists("https://example.com/A").await.unwrap());
        assert!(!repo.link_exists("https://example.com/").await.unwrap());
    }

    #[tokio::test]
    async fn news_keeps_insertion_order_and_timestamp() {
        let test = test_repo().await;
        let repo = &test.repo;

        repo.insert_news_item(news("https://example.com/2", 1))
            .await
            .unwrap();
        repo.insert_news_item(news("https://example.com/1", 1))
            .await
            .unwrap();

        let items = repo.list_news().await.unwrap();
        let links: Vec<_> = items.iter().map(|n| n.link.as_str()).collect();
        assert_eq!(links, ["https://example.com/2", "https://example.com/1"]);
        assert_eq!(items[0].source_id, Some(1));
        assert!(items[0].date_added > Utc::now() - Duration::minutes(1));
    }

    #[tokio::test]
    async fn deletes_only_touch_their_own_table() {
        let test = test_repo().await;
        let repo = &test.repo;

        let source_id = match repo
            .insert_source(NewSource {
                name: None,
                url: "https://example.com/rss".into(),
            })
            .await
            .unwrap()
        {
            InsertOutcome::Inserted(id) => id,
            InsertOutcome::AlreadyExists => panic!("fresh database"),
        };
        repo.insert_keyword("rust").await.unwrap();
        repo.insert_news_item(news("https://example.com/a", source_id))
            .await
            .unwrap();

        assert_eq!(repo.delete_all_sources().await.unwrap(), 1);
        assert!(repo.list_sources().await.unwrap().is_empty());
        assert_eq!(repo.list_keywords().await.unwrap().len(), 1);
        // orphaned rows stay behind
        assert_eq!(repo.list_news().await.unwrap()[0].source_id, Some(source_id));

        assert_eq!(repo.delete_all_news().await.unwrap(), 1);
        assert!(repo.list_news().await.unwrap().is_empty());
        assert_eq!(repo.list_keywords().await.unwrap().len(), 1);

        assert_eq!(repo.delete_all_keywords().await.unwrap(), 1);
        assert!(repo.list_keywords().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_source_with_news_keeps_the_news() {
        let test = test_repo().await;
        let repo = &test.repo;

        let InsertOutcome::Inserted(source_id) = repo
            .insert_source(NewSource {
                name: Some("Feed".into()),
                url: "https://example.com/rss".into(),
            })
            .await
            .unwrap()
        else {
            panic!("fresh database");
        };
        repo.insert_news_item(news("https://example.com/a", source_id))
            .await
            .unwrap();

        assert_eq!(repo.delete_source(source_id).await.unwrap(), 1);
        assert!(repo.list_sources().await.unwrap().is_empty());

        let items = repo.list_news().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source_id, Some(source_id));
    }

    #[tokio::test]
    async fn news_for_missing_source_is_accepted() {
        let test = test_repo().await;
        let repo = &test.repo;

        repo.insert_news_item(news("https://example.com/orphan", 999))
            .await
            .unwrap();
        assert_eq!(repo.list_news().await.unwrap()[0].source_id, Some(999));
    }

    #[tokio::test]
    async fn database_with_declared_foreign_key_still_allows_source_delete() {
        let tmpdir = tempfile::tempdir().unwrap();
        let db_path = tmpdir.path().join("legacy.db");
        {
            let conn = rusqlite::Connection::open(&db_path).unwrap();
            conn.execute_batch(
                r#"CREATE TABLE sources (
                       id INTEGER PRIMARY KEY AUTOINCREMENT,
                       name TEXT,
                       url TEXT NOT NULL UNIQUE
                   );
                   CREATE TABLE news (
                       id INTEGER PRIMARY KEY AUTOINCREMENT,
                       title TEXT,
                       description TEXT,
                       link TEXT,
                       source_id INTEGER,
                       date_added TEXT NOT NULL DEFAULT (datetime('now')),
                       FOREIGN KEY(source_id) REFERENCES sources(id)
                   );"#,
            )
            .unwrap();
        }

        let repo = Repository::new(&db_path).await.unwrap();
        repo.insert_source(NewSource {
            name: None,
            url: "https://example.com/rss".into(),
        })
        .await
        .unwrap();
        let source_id = repo.list_sources().await.unwrap()[0].id;
        repo.insert_news_item(news("https://example.com/a", source_id))
            .await
            .unwrap();

        assert_eq!(repo.delete_all_sources().await.unwrap(), 1);
        assert_eq!(repo.list_news().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_by_id_removes_single_row() {
        let test = test_repo().await;
        let repo = &test.repo;

        let InsertOutcome::Inserted(keep) = repo.insert_keyword("keep").await.unwrap() else {
            panic!("fresh database");
        };
        let InsertOutcome::Inserted(gone) = repo.insert_keyword("drop").await.unwrap() else {
            panic!("fresh database");
        };

        assert_eq!(repo.delete_keyword(gone).await.unwrap(), 1);
        assert_eq!(repo.delete_keyword(gone).await.unwrap(), 0);

        let keywords = repo.list_keywords().await.unwrap();
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].id, keep);
    }

    #[tokio::test]
    async fn invalid_datetime_in_row_falls_back_to_now() {
        let test = test_repo().await;
        let repo = &test.repo;

        let id = repo
            .insert_news_item(news("https://example.com/date", 1))
            .await
            .unwrap();

        let conn = repo.connect().await.unwrap();
        conn.call(move |conn| {
            conn.execute(
                "UPDATE news SET date_added = 'not-a-datetime' WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let item = repo.list_news().await.unwrap().remove(0);
        assert!(item.date_added > Utc::now() - Duration::minutes(1));
    }
}
