use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fmt;

const DEFAULT_API_BASE: &str = "https://api.unsplash.com";

#[derive(Debug)]
pub enum ImageSearchError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for ImageSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSearchError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            ImageSearchError::HttpError(err) => write!(f, "HTTP error: {}", err),
            ImageSearchError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for ImageSearchError {}

impl From<reqwest::Error> for ImageSearchError {
    fn from(err: reqwest::Error) -> Self {
        ImageSearchError::HttpError(err)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: ImageUrls,
}

#[derive(Debug, Deserialize)]
struct ImageUrls {
    regular: String,
}

#[derive(Clone)]
pub struct ImageSearchService {
    client: Client,
    base_url: String,
    access_key: String,
}

impl ImageSearchService {
    pub fn new() -> Result<Self, ImageSearchError> {
        let access_key = env::var("IMAGE_API_KEY").map_err(|_| {
            ImageSearchError::EnvironmentError("IMAGE_API_KEY not set".to_string())
        })?;
        let base_url = env::var("IMAGE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self {
            client: Client::new(),
            base_url,
            access_key,
        })
    }

    /// First `limit` image URLs for a free-text query.
    pub async fn search_images(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, ImageSearchError> {
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .query(&[("query", query), ("per_page", &limit.to_string())])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImageSearchError::ResponseError(format!(
                "Image API returned error status: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .take(limit)
            .map(|r| r.urls.regular)
            .collect())
    }
}
