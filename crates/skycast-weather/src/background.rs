//! Background photo search (Pexels).

use rand::Rng;
use reqwest::{header, Client};
use serde::Deserialize;
use skycast_core::PhotosConfig;
use tracing::instrument;

use crate::http::fetch_json;
use crate::types::WeatherError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSource,
}

#[derive(Debug, Deserialize)]
struct PhotoSource {
    original: String,
}

/// Pick one entry uniformly at random.
pub fn pick_random<'a, R: Rng + ?Sized>(urls: &'a [String], rng: &mut R) -> Option<&'a str> {
    if urls.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..urls.len());
    urls.get(index).map(String::as_str)
}

#[derive(Debug, Clone)]
pub struct PhotoClient {
    client: Client,
    config: PhotosConfig,
}

impl PhotoClient {
    pub fn new(client: Client, config: PhotosConfig) -> Self {
        Self { client, config }
    }

    pub fn default_background(&self) -> &str {
        &self.config.default_background
    }

    pub fn initial_query(&self) -> &str {
        &self.config.initial_query
    }

    /// Original-size URLs of the first result page for `query`
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str) -> Result<Vec<String>, WeatherError> {
        let per_page = self.config.per_page.to_string();
        let request = self
            .client
            .get(&self.config.search_url)
            .header(header::AUTHORIZATION, self.config.api_key.as_str())
            .query(&[("query", query), ("per_page", per_page.as_str())]);

        let response: SearchResponse = fetch_json(request, "photo search").await?;
        Ok(response.photos.into_iter().map(|p| p.src.original).collect())
    }

    /// Choose a background for a weather description. `Ok(None)` means the
    /// search came back empty and the current background should stay.
    pub async fn search_background(&self, description: &str) -> Result<Option<String>, WeatherError> {
        let urls = self.search(description).await?;
        let choice = pick_random(&urls, &mut rand::thread_rng()).map(str::to_owned);
        if choice.is_none() {
            tracing::warn!("No photos found for the query {:?}", description);
        }
        Ok(choice)
    }
}
