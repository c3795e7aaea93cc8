//! A standalone client for the Google Custom Search JSON API.
//!
//! Independent utility: it issues a single HTTP request per search and
//! parses the JSON result list. It shares no state or protocol with the
//! rendezvous/gossip crates of this workspace.

use std::{
    error::Error,
    time::{Duration, Instant},
};

use serde::Deserialize;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Result URLs of one search, in ranked order, together with the
/// observed request latency.
#[derive(Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub urls: Vec<String>,
    pub elapsed: Duration,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: String,
}

/// Issues single search requests against the Custom Search API.
pub struct SearchClient {
    api_key: String,
    engine_id: String,
    http: reqwest::blocking::Client,
}

impl SearchClient {
    pub fn new(api_key: String, engine_id: String) -> Self {
        Self {
            api_key,
            engine_id,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Performs one search and returns up to `num_results` result URLs plus
    /// the elapsed request latency. A non-success HTTP status is reported as
    /// an error carrying the status code and the response body.
    pub fn search(&self, query: &str, num_results: u32) -> Result<SearchOutcome, Box<dyn Error>> {
        let num_results = num_results.to_string();
        let started_at = Instant::now();

        let response = self
            .http
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num_results.as_str()),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        let elapsed = started_at.elapsed();

        if !status.is_success() {
            return Err(From::from(format!(
                "search request failed: HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(SearchOutcome {
            urls: parse_result_links(&body)?,
            elapsed,
        })
    }
}

/// Extracts the ranked result URLs from a Custom Search JSON response.
/// A response without an `items` array yields an empty list.
pub fn parse_result_links(body: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    Ok(response
        .items
        .into_iter()
        .map(|item| item.link)
        .collect())
}
