use crate::app::ports::{BibleTextPort, Passage};
use crate::config::BibleConfig;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Fetch-only client for the hosted Bible-text provider. The API key stays
/// server-side (BIBLE_API_KEY); clients go through /api/bible/passage.
pub struct BibleApiClient {
    base_url: String,
    bible_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    passages: Vec<PassageData>,
}

#[derive(Debug, Deserialize)]
struct PassageData {
    reference: String,
    content: String,
    copyright: Option<String>,
}

impl BibleApiClient {
    pub fn new(config: &BibleConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bible_id: config.bible_id.clone(),
        }
    }
}

#[async_trait]
impl BibleTextPort for BibleApiClient {
    async fn fetch_passage(&self, reference: &str) -> Result<Passage, String> {
        let key = std::env::var("BIBLE_API_KEY")
            .map_err(|_| "BIBLE_API_KEY environment variable not set".to_string())?;
        let endpoint = format!("{}/bibles/{}/search", self.base_url, self.bible_id);
        debug!("Fetching passage '{}' from {}", reference, endpoint);

        let client = reqwest::Client::new();
        let resp = client
            .get(&endpoint)
            .header("api-key", key)
            .query(&[("query", reference), ("limit", "1")])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("passage fetch failed: {} - {}", status, body));
        }

        let search: SearchResponse = resp.json().await.map_err(|e| e.to_string())?;
        let passage = search
            .data
            .passages
            .into_iter()
            .next()
            .ok_or_else(|| format!("no passage found for '{reference}'"))?;

        Ok(Passage {
            reference: passage.reference,
            text: passage.content,
            copyright: passage.copyright,
        })
    }
}
