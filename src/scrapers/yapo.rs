use crate::scrapers::traits::{FetchError, PageSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_LISTING_URL: &str =
    "https://www.yapo.cl/bienes-raices-alquiler-apartamentos/valparaiso-valparaiso";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the shared HTTP client used for listing pages and the UF indicator
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

/// Yapo listing pages over HTTP
pub struct YapoScraper {
    client: Client,
}

impl YapoScraper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for YapoScraper {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "Yapo"
    }
}
