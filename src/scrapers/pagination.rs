use crate::models::{ListingRecord, ReferenceRate};
use crate::scrapers::extract::ListingExtractor;
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::Pacing;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// `{base}` for the first page, `{base}.{n}` afterwards
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}.{}", base_url, page)
    }
}

/// Records collected across all pages, plus counters for the run summary
#[derive(Debug, Default)]
pub struct PaginationOutcome {
    pub records: Vec<ListingRecord>,
    pub total_pages: u32,
    pub pages_fetched: u32,
    pub pages_skipped: u32,
    /// Set when a page came back with no listings before `total_pages` was reached
    pub stopped_early_at: Option<u32>,
}

/// Walks the listing pages one at a time
pub struct Paginator<'a, S: PageSource> {
    source: &'a S,
    extractor: &'a ListingExtractor,
    rate: ReferenceRate,
    pacing: Pacing,
}

impl<'a, S: PageSource> Paginator<'a, S> {
    pub fn new(source: &'a S, extractor: &'a ListingExtractor, rate: ReferenceRate, pacing: Pacing) -> Self {
        Self {
            source,
            extractor,
            rate,
            pacing,
        }
    }

    /// Fetch and extract pages sequentially until the last page, or until a
    /// page yields no listings. Failed fetches are skipped, never fatal.
    pub async fn run(&self, base_url: &str, max_pages: Option<u32>) -> PaginationOutcome {
        let mut outcome = PaginationOutcome::default();

        info!("Fetching page 1 from {}: {}", self.source.source_name(), base_url);
        let mut first_page = match self.source.fetch_page(base_url).await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!("⚠️ Page 1 failed: {}", e);
                None
            }
        };

        let discovered = first_page
            .as_deref()
            .and_then(|html| self.extractor.last_page(html))
            .unwrap_or(1);
        outcome.total_pages = match max_pages {
            Some(cap) => discovered.min(cap.max(1)),
            None => discovered,
        };
        info!("📄 {} page(s) to scrape (discovered {})", outcome.total_pages, discovered);

        for page in 1..=outcome.total_pages {
            let html = if page == 1 {
                first_page.take()
            } else {
                self.pause().await;
                let url = page_url(base_url, page);
                debug!("Scraping page {}: {}", page, url);
                match self.source.fetch_page(&url).await {
                    Ok(html) => Some(html),
                    Err(e) => {
                        warn!("⚠️ Page {} failed, skipping: {}", page, e);
                        None
                    }
                }
            };

            let Some(html) = html else {
                outcome.pages_skipped += 1;
                continue;
            };
            outcome.pages_fetched += 1;

            let records = self.extractor.extract_page(&html, self.rate);
            if records.is_empty() {
                info!("🏁 Page {} has no listings, stopping", page);
                if page < outcome.total_pages {
                    outcome.stopped_early_at = Some(page);
                }
                break;
            }

            info!("✅ Page {} parsed ({} listings)", page, records.len());
            outcome.records.extend(records);
        }

        outcome
    }

    async fn pause(&self) {
        let delay = random_delay(self.pacing);
        if !delay.is_zero() {
            debug!("Waiting {} ms before next request", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}

fn random_delay(pacing: Pacing) -> Duration {
    if pacing.max <= pacing.min {
        return pacing.min;
    }
    let min = pacing.min.as_millis() as u64;
    let max = pacing.max.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}
