use anyhow::{anyhow, Context, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Named CSS lookup rules for the listing markup.
///
/// These track the site's current markup and are expected to change, so they
/// can be overridden from a JSON file without touching code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListingSelectors {
    /// One listing tile
    pub listing: String,
    pub title: String,
    pub price: String,
    /// Discount badge, which may sit inside the price element
    pub discount: String,
    /// Hyperlink candidates inside a tile
    pub link: String,
    /// Pagination control pointing at the last page
    pub last_page: String,
    /// Hrefs containing any of these are treated as site navigation, not listings.
    /// Best-effort only.
    pub link_exclusions: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            listing: "div.d3-ad-tile".to_string(),
            title: ".d3-ad-tile__title".to_string(),
            price: ".d3-ad-tile__price".to_string(),
            discount: ".d3-ad-tile__price-reduction".to_string(),
            link: "a[href]".to_string(),
            last_page: "a.d3-pagination__page--last".to_string(),
            link_exclusions: vec!["yapo.cl".to_string()],
        }
    }
}

impl ListingSelectors {
    /// Load rules from a JSON file; keys left out keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selectors file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid selectors file {}", path.display()))
    }

    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            listing: parse_selector("listing", &self.listing)?,
            title: parse_selector("title", &self.title)?,
            price: parse_selector("price", &self.price)?,
            discount: parse_selector("discount", &self.discount)?,
            link: parse_selector("link", &self.link)?,
            last_page: parse_selector("last_page", &self.last_page)?,
            link_exclusions: self.link_exclusions.clone(),
        })
    }
}

fn parse_selector(rule: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid `{}` selector {:?}: {:?}", rule, css, e))
}

/// Parsed form of [`ListingSelectors`]
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub listing: Selector,
    pub title: Selector,
    pub price: Selector,
    pub discount: Selector,
    pub link: Selector,
    pub last_page: Selector,
    pub link_exclusions: Vec<String>,
}

/// Randomized wait inserted between page requests
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(2),
            max: Duration::from_secs(4),
        }
    }
}

impl Pacing {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        let (min, max) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    #[cfg(test)]
    pub fn none() -> Self {
        Self::from_millis(0, 0)
    }
}
