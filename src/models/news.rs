use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    pub source_id: Option<i64>,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNewsItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub source_id: i64,
}
