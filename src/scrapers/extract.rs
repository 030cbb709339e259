use crate::models::{ListingRecord, ReferenceRate, LINK_UNAVAILABLE, NO_DISCOUNT};
use crate::pricing::normalize;
use crate::scrapers::types::CompiledSelectors;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Turns one page of listing markup into normalized records
pub struct ListingExtractor {
    selectors: CompiledSelectors,
    /// Scheme and host that root-relative links are resolved against
    origin: String,
}

impl ListingExtractor {
    pub fn new(selectors: CompiledSelectors, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("Invalid listing URL {}", base_url))?;
        let origin = url.origin().ascii_serialization();

        Ok(Self { selectors, origin })
    }

    /// Extract every complete listing on the page, in document order.
    /// Tiles without a title or a price are skipped.
    pub fn extract_page(&self, html: &str, rate: ReferenceRate) -> Vec<ListingRecord> {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.listing)
            .enumerate()
            .filter_map(|(idx, tile)| {
                let record = self.extract_listing(tile, rate);
                if record.is_none() {
                    debug!("Skipped listing {}: missing title or price", idx);
                }
                record
            })
            .collect()
    }

    fn extract_listing(&self, tile: ElementRef<'_>, rate: ReferenceRate) -> Option<ListingRecord> {
        let title_el = tile.select(&self.selectors.title).next()?;
        let price_el = tile.select(&self.selectors.price).next()?;

        let title = collapse_whitespace(&title_el.text().collect::<String>());
        if title.is_empty() {
            return None;
        }

        let discount_text = tile
            .select(&self.selectors.discount)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_DISCOUNT.to_string());

        let price_text = text_excluding(price_el, &self.selectors.discount)
            .trim()
            .to_string();
        let price = normalize(&price_text, rate);

        Some(ListingRecord {
            title,
            price_text_original: price_text,
            price_amount_clp: price.amount_clp,
            currency_origin: price.origin,
            discount_text,
            link: self.resolve_link(tile),
        })
    }

    /// First usable href in the tile, made absolute
    fn resolve_link(&self, tile: ElementRef<'_>) -> String {
        let own_href = (tile.value().name() == "a")
            .then(|| tile.value().attr("href"))
            .flatten();

        own_href
            .into_iter()
            .chain(tile.select(&self.selectors.link).filter_map(|a| a.value().attr("href")))
            .map(str::trim)
            .filter(|href| self.is_listing_href(href))
            .find_map(|href| self.absolutize(href))
            .unwrap_or_else(|| LINK_UNAVAILABLE.to_string())
    }

    fn is_listing_href(&self, href: &str) -> bool {
        !href.is_empty()
            && href != "#"
            && !self
                .selectors
                .link_exclusions
                .iter()
                .any(|excluded| href.contains(excluded.as_str()))
    }

    fn absolutize(&self, href: &str) -> Option<String> {
        if href.starts_with('/') {
            Some(format!("{}{}", self.origin, href))
        } else if href.starts_with("http") {
            Some(href.to_string())
        } else {
            None
        }
    }

    /// Page count announced by the pagination control, if any
    pub fn last_page(&self, html: &str) -> Option<u32> {
        let document = Html::parse_document(html);
        let control = document.select(&self.selectors.last_page).next()?;

        let from_text = control.text().collect::<String>().trim().parse::<u32>().ok();
        let from_href = || {
            control
                .value()
                .attr("href")
                .and_then(|href| href.rsplit('.').next())
                .and_then(|suffix| suffix.trim_end_matches('/').parse::<u32>().ok())
        };

        from_text.or_else(from_href).filter(|pages| *pages > 0)
    }
}

/// Text of `el` with any descendants matching `excluded` left out
fn text_excluding(el: ElementRef<'_>, excluded: &Selector) -> String {
    let skipped: Vec<_> = el.select(excluded).map(|e| e.id()).collect();

    let mut out = String::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if node.ancestors().any(|ancestor| skipped.contains(&ancestor.id())) {
            continue;
        }
        out.push_str(text);
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
