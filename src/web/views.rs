//! HTML pages for the management UI.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::models::{Keyword, NewsItem, Source};

const NAV: &str = r#"<nav><a href="/">News</a> | <a href="/add_source">Add source</a> | <a href="/add_keyword">Add keyword</a> | <a href="/manage">Manage</a></nav>"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        text(title),
        NAV,
        text(title),
        body
    )
}

pub fn news_page(news: &[NewsItem]) -> String {
    let mut body = String::new();
    if news.is_empty() {
        body.push_str("<p>No news collected yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for item in news {
            let _ = writeln!(
                body,
                "<li><a href=\"{}\">{}</a> <small>{}</small><p>{}</p></li>",
                attr(&item.link),
                text(&item.title),
                item.date_added.format("%Y-%m-%d %H:%M:%S"),
                text(&item.description)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str(
        "<form method=\"post\" action=\"/delete_all_news\"><button type=\"submit\">Delete all news</button></form>\n",
    );
    page("News", &body)
}

pub fn add_source_page() -> String {
    page(
        "Add source",
        r#"<form method="post" action="/add_source">
<label>Name <input type="text" name="name"></label>
<label>URL <input type="url" name="url" required></label>
<button type="submit">Add</button>
</form>"#,
    )
}

pub fn add_keyword_page() -> String {
    page(
        "Add keyword",
        r#"<form method="post" action="/add_keyword">
<label>Keyword <input type="text" name="word" required></label>
<button type="submit">Add</button>
</form>"#,
    )
}

pub fn manage_page(sources: &[Source], keywords: &[Keyword]) -> String {
    let mut body = String::from("<h2>Sources</h2>\n<table>\n<tr><th>ID</th><th>Name</th><th>URL</th><th></th></tr>\n");
    for source in sources {
        let _ = writeln!(
            body,
            "<tr><td>{id}</td><td>{}</td><td>{}</td><td><form method=\"post\" action=\"/delete_source\"><input type=\"hidden\" name=\"source_id\" value=\"{id}\"><button type=\"submit\">Delete</button></form></td></tr>",
            text(source.display_name()),
            text(&source.url),
            id = source.id
        );
    }
    body.push_str("</table>\n<form method=\"post\" action=\"/delete_all_sources\"><button type=\"submit\">Delete all sources</button></form>\n");

    body.push_str("<h2>Keywords</h2>\n<table>\n<tr><th>ID</th><th>Word</th><th></th></tr>\n");
    for keyword in keywords {
        let _ = writeln!(
            body,
            "<tr><td>{id}</td><td>{}</td><td><form method=\"post\" action=\"/delete_keyword\"><input type=\"hidden\" name=\"keyword_id\" value=\"{id}\"><button type=\"submit\">Delete</button></form></td></tr>",
            text(&keyword.word),
            id = keyword.id
        );
    }
    body.push_str("</table>\n<form method=\"post\" action=\"/delete_all_keywords\"><button type=\"submit\">Delete all keywords</button></form>\n");

    page("Manage", &body)
}
