use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{url} returned status {status}")]
    Status { status: StatusCode, url: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that can hand back the HTML of a listing page.
/// The HTTP scraper implements it; tests plug in canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the raw HTML behind `url`
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}
