use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
}

/// A single user review of a movie. `(movie_id, username, created_at)` is
/// the identity key for updates and deletes; there is no surrogate id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub movie_id: u32,
    pub username: String,
    pub rating: u8,
    pub text: String,
    pub created_at: i64,
}

impl Review {
    pub fn new(movie_id: u32, username: &str, rating: u8, text: &str) -> Self {
        Review {
            movie_id,
            username: username.to_owned(),
            rating: rating.clamp(1, 5),
            text: text.to_owned(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub movie_id: u32,
    pub title: String,
    pub poster_url: String,
}

/// Key for watchlist storage: a username, or the shared guest bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    User(String),
    Guest,
}

impl Identity {
    pub fn file_stem(&self) -> &str {
        match self {
            Identity::User(name) => name,
            Identity::Guest => "guest",
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MovieSummary {
    pub id: u32,
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Video {
    #[serde(rename = "type")]
    pub kind: String,
    pub site: String,
    pub key: String,
}
