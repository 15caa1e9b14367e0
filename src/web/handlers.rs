//! Request handlers. Every write redirects back to a listing page whether or
//! not it changed anything.

use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{InsertOutcome, NewSource};

use super::{views, AppState};

#[derive(Debug, Deserialize)]
pub struct SourceForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordForm {
    #[serde(default)]
    pub word: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSourceForm {
    pub source_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteKeywordForm {
    pub keyword_id: Option<String>,
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|id| id.trim().parse().ok())
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let news = state.repository.list_news().await?;
    Ok(Html(views::news_page(&news)))
}

/// GET /add_source
pub async fn add_source_form() -> Html<String> {
    Html(views::add_source_page())
}

/// POST /add_source
pub async fn add_source(
    State(state): State<AppState>,
    Form(form): Form<SourceForm>,
) -> Result<Redirect> {
    let url = form.url.trim();
    if url.is_empty() {
        tracing::debug!("Ignoring source without url");
        return Ok(Redirect::to("/"));
    }

    let name = form.name.trim();
    let outcome = state
        .repository
        .insert_source(NewSource {
            name: (!name.is_empty()).then(|| name.to_string()),
            url: url.to_string(),
        })
        .await?;

    match outcome {
        InsertOutcome::Inserted(id) => tracing::info!("Added source {} ({})", url, id),
        InsertOutcome::AlreadyExists => tracing::info!("Source already exists: {}", url),
    }
    Ok(Redirect::to("/"))
}

/// GET /add_keyword
pub async fn add_keyword_form() -> Html<String> {
    Html(views::add_keyword_page())
}

/// POST /add_keyword
pub async fn add_keyword(
    State(state): State<AppState>,
    Form(form): Form<KeywordForm>,
) -> Result<Redirect> {
    let word = form.word.trim();
    if word.is_empty() {
        tracing::debug!("Ignoring empty keyword");
        return Ok(Redirect::to("/"));
    }

    match state.repository.insert_keyword(word).await? {
        InsertOutcome::Inserted(id) => tracing::info!("Added keyword {} ({})", word, id),
        InsertOutcome::AlreadyExists => tracing::info!("Keyword already exists: {}", word),
    }
    Ok(Redirect::to("/"))
}

/// POST /delete_source
pub async fn delete_source(
    State(state): State<AppState>,
    Form(form): Form<DeleteSourceForm>,
) -> Result<Redirect> {
    if let Some(id) = parse_id(form.source_id.as_deref()) {
        let deleted = state.repository.delete_source(id).await?;
        tracing::info!("Deleted source {} ({} rows)", id, deleted);
    }
    Ok(Redirect::to("/manage"))
}

/// POST /delete_all_sources
pub async fn delete_all_sources(State(state): State<AppState>) -> Result<Redirect> {
    let deleted = state.repository.delete_all_sources().await?;
    tracing::info!("Deleted all sources ({} rows)", deleted);
    Ok(Redirect::to("/"))
}

/// POST /delete_keyword
pub async fn delete_keyword(
    State(state): State<AppState>,
    Form(form): Form<DeleteKeywordForm>,
) -> Result<Redirect> {
    if let Some(id) = parse_id(form.keyword_id.as_deref()) {
        let deleted = state.repository.delete_keyword(id).await?;
        tracing::info!("Deleted keyword {} ({} rows)", id, deleted);
    }
    Ok(Redirect::to("/manage"))
}

/// POST /delete_all_keywords
pub async fn delete_all_keywords(State(state): State<AppState>) -> Result<Redirect> {
    let deleted = state.repository.delete_all_keywords().await?;
    tracing::info!("Deleted all keywords ({} rows)", deleted);
    Ok(Redirect::to("/"))
}

/// POST /delete_all_news
pub async fn delete_all_news(State(state): State<AppState>) -> Result<Redirect> {
    let deleted = state.repository.delete_all_news().await?;
    tracing::info!("Deleted all news ({} rows)", deleted);
    Ok(Redirect::to("/"))
}

/// GET /manage
pub async fn manage(State(state): State<AppState>) -> Result<Html<String>> {
    let sources = state.repository.list_sources().await?;
    let keywords = state.repository.list_keywords().await?;
    Ok(Html(views::manage_page(&sources, &keywords)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_parsed_leniently() {
        assert_eq!(parse_id(Some(" 42 ")), Some(42));
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(Some("abc")), None);
        assert_eq!(parse_id(None), None);
    }
}
