//! Catalog gateway: thin client for the external movie-metadata service.
//! Everything here is pass-through; the service is an opaque HTTP+JSON
//! collaborator and failures degrade to user-visible notices upstream.

use crate::model::{Genre, MovieSummary, Video};
use log::debug;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w185";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
// The discover endpoint has far more pages than this, but the first fifty
// give enough variety for the random pick.
const DISCOVER_PAGE_RANGE: u32 = 50;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct GenreList {
    genres: Vec<Genre>,
}

#[derive(Deserialize)]
struct MoviePage {
    results: Vec<MovieSummary>,
}

#[derive(Deserialize)]
struct VideoList {
    results: Vec<Video>,
}

pub struct CatalogGateway {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl CatalogGateway {
    pub fn new(api_key: String) -> Result<Self, GatewayError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_owned(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Result<Self, GatewayError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(CatalogGateway {
            http,
            base_url,
            api_key,
        })
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }

    /// Genre id to name mapping for the filter dropdown.
    pub fn genres(&self) -> Result<HashMap<u32, String>, GatewayError> {
        let list: GenreList = self.get("/genre/movie/list", &[])?;
        Ok(list.genres.into_iter().map(|g| (g.id, g.name)).collect())
    }

    pub fn search(&self, query: &str) -> Result<Vec<MovieSummary>, GatewayError> {
        let page: MoviePage = self.get("/search/movie", &[("query", query)])?;
        Ok(page.results)
    }

    pub fn discover(&self, page: u32) -> Result<Vec<MovieSummary>, GatewayError> {
        let page = page.to_string();
        let page: MoviePage = self.get("/discover/movie", &[("page", page.as_str())])?;
        Ok(page.results)
    }

    /// Picks a random movie with a poster from a random discover page.
    pub fn random_movie(&self) -> Result<Option<MovieSummary>, GatewayError> {
        let mut rng = rand::thread_rng();
        let page = rng.gen_range(1..=DISCOVER_PAGE_RANGE);
        let mut results = self.discover(page)?;
        results.retain(|m| m.poster_path.is_some());
        if results.is_empty() {
            return Ok(None);
        }
        let index = rng.gen_range(0..results.len());
        Ok(Some(results.swap_remove(index)))
    }

    /// YouTube watch URL of the movie's first trailer, if it has one.
    pub fn trailer_url(&self, movie_id: u32) -> Result<Option<String>, GatewayError> {
        let list: VideoList = self.get(&format!("/movie/{}/videos", movie_id), &[])?;
        Ok(pick_trailer(&list.results))
    }
}

fn pick_trailer(videos: &[Video]) -> Option<String> {
    videos
        .iter()
        .find(|v| v.kind.eq_ignore_ascii_case("Trailer") && v.site.eq_ignore_ascii_case("YouTube"))
        .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
}

pub fn poster_url(poster_path: &str) -> String {
    format!("{}{}", POSTER_BASE_URL, poster_path)
}

/// Client-side genre filter: keeps a movie when no genre is selected or when
/// one of its genre ids maps to the selected name.
pub fn matches_genre(
    movie: &MovieSummary,
    genre_map: &HashMap<u32, String>,
    selected: Option<&str>,
) -> bool {
    match selected {
        None => true,
        Some(name) => movie
            .genre_ids
            .iter()
            .any(|id| genre_map.get(id).map(String::as_str) == Some(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_search_results() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 680, "title": "Pulp Fiction",
                 "poster_path": "/pulp.jpg",
                 "overview": "A burger-loving hit man...",
                 "genre_ids": [53, 80]},
                {"id": 11, "title": "Obscure Short", "poster_path": null,
                 "overview": null, "genre_ids": []}
            ],
            "total_pages": 1
        }"#;
        let page: MoviePage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, 680);
        assert_eq!(page.results[0].genre_ids, vec![53, 80]);
        assert!(page.results[1].poster_path.is_none());
    }

    #[test]
    fn decodes_genre_list() {
        let body = r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 80, "name": "Crime"}]}"#;
        let list: GenreList = serde_json::from_str(body).unwrap();
        assert_eq!(list.genres.len(), 2);
        assert_eq!(list.genres[1].name, "Crime");
    }

    #[test]
    fn trailer_pick_wants_youtube_trailers_only() {
        let body = r#"{"results": [
            {"type": "Featurette", "site": "YouTube", "key": "feat"},
            {"type": "Trailer", "site": "Vimeo", "key": "vimeo"},
            {"type": "trailer", "site": "youtube", "key": "abc123"},
            {"type": "Trailer", "site": "YouTube", "key": "later"}
        ]}"#;
        let list: VideoList = serde_json::from_str(body).unwrap();
        assert_eq!(
            pick_trailer(&list.results).as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(pick_trailer(&[]), None);
    }

    #[test]
    fn genre_filter_matches_by_name() {
        let genre_map: HashMap<u32, String> =
            vec![(28, "Action".to_owned()), (80, "Crime".to_owned())]
                .into_iter()
                .collect();
        let movie = MovieSummary {
            id: 680,
            title: "Pulp Fiction".to_owned(),
            poster_path: Some("/pulp.jpg".to_owned()),
            overview: None,
            genre_ids: vec![53, 80],
        };
        assert!(matches_genre(&movie, &genre_map, None));
        assert!(matches_genre(&movie, &genre_map, Some("Crime")));
        assert!(!matches_genre(&movie, &genre_map, Some("Action")));
        assert!(!matches_genre(&movie, &genre_map, Some("Unknown")));
    }

    #[test]
    fn poster_url_joins_base_and_path() {
        assert_eq!(poster_url("/pulp.jpg"), "https://image.tmdb.org/t/p/w185/pulp.jpg");
    }
}
