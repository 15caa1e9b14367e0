#[derive(Debug, Clone)]
pub struct Keyword {
    pub id: i64,
    pub word: String,
}
