//! HTTP client for the movie API.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::{config::AppConfig, models::Movie};

pub use reqwest::StatusCode;

/// Failures talking to the movie API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: StatusCode,
    },
    /// The body was not the expected `{ "results": ... }` envelope.
    #[error("unexpected payload from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// JSON error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    results: T,
}

/// Parse a `{ "results": ... }` body.
pub fn parse_results<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    serde_json::from_str::<Envelope<T>>(body).map(|envelope| envelope.results)
}

/// Thin wrapper over `reqwest` for the two movie endpoints.
#[derive(Clone)]
pub struct MovieClient {
    client: Client,
    base_url: String,
}

impl MovieClient {
    /// Build a client for `config.api_base_url` honouring the configured timeout.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .user_agent(concat!("moviedeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// API host without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint listing all movies.
    pub fn index_url(&self) -> String {
        format!("{}/api/movies/", self.base_url)
    }

    /// Endpoint for a single movie.
    pub fn movie_url(&self, id: u64) -> String {
        format!("{}{}", self.index_url(), id)
    }

    /// `GET /api/movies/`.
    pub async fn fetch_movies(&self) -> Result<Vec<Movie>, ApiError> {
        self.get(self.index_url()).await
    }

    /// `GET /api/movies/{id}`.
    pub async fn fetch_movie(&self, id: u64) -> Result<Movie, ApiError> {
        self.get(self.movie_url(id)).await
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(ApiError::Request { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => return Err(ApiError::Request { url, source }),
        };
        parse_results(&body).map_err(|source| ApiError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> MovieClient {
        let config = AppConfig {
            api_base_url: base.to_string(),
            ..AppConfig::default()
        };
        MovieClient::new(&config).unwrap()
    }

    #[test]
    fn endpoints_follow_api_layout() {
        let client = client("https://movies.example/");
        assert_eq!(client.base_url(), "https://movies.example");
        assert_eq!(client.index_url(), "https://movies.example/api/movies/");
        assert_eq!(client.movie_url(42), "https://movies.example/api/movies/42");
    }

    #[test]
    fn parses_list_and_single_envelopes() {
        let list: Vec<Movie> = parse_results(
            r#"{"results": [
                {"id": 1, "title": "Jurassic World", "image": "a.jpg",
                 "release_date": "2015-06-12", "description": "Dinosaurs"},
                {"id": 2, "title": "Inside Out", "image": "b.jpg",
                 "release_date": "2015-06-19", "description": "Feelings"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].title, "Inside Out");

        let single: Movie = parse_results(
            r#"{"results": {"id": 9, "title": "Up", "image": "up.jpg",
                "release_date": "2009-05-29", "description": "Balloons"}}"#,
        )
        .unwrap();
        assert_eq!(single.id, 9);
    }

    #[test]
    fn rejects_bodies_without_results() {
        assert!(parse_results::<Vec<Movie>>(r#"{"data": []}"#).is_err());
    }

    #[tokio::test]
    async fn unreachable_host_reports_request_error() {
        let client = client("http://127.0.0.1:9");
        match client.fetch_movies().await {
            Err(ApiError::Request { url, .. }) => {
                assert_eq!(url, "http://127.0.0.1:9/api/movies/")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
