#[derive(Debug, Clone)]
pub struct Source {
    pub id: i64,
    pub name: Option<String>,
    pub url: String,
}

impl Source {
    /// Label shown in the UI, the url when no name was given.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone)]
pub struct NewSource {
    pub name: Option<String>,
    pub url: String,
}
