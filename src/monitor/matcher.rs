use regex::Regex;

use crate::error::Result;

/// Whole-word, case-insensitive keyword test over an entry's title and description.
#[derive(Debug)]
pub struct KeywordMatcher {
    patterns: Vec<Regex>,
}

impl KeywordMatcher {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .map(|word| Regex::new(&format!(r"\b{}\b", regex::escape(&word))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, title: &str, description: &str) -> bool {
        let text = format!("{} {}", title, description).to_lowercase();
        self.patterns.iter().any(|pattern| pattern.is_match(&text))
    }
}
