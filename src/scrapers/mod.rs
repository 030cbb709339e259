pub mod extract;
pub mod pagination;
pub mod traits;
pub mod types;
pub mod yapo;

pub use extract::ListingExtractor;
pub use pagination::Paginator;
pub use types::{ListingSelectors, Pacing};
pub use yapo::{build_client, YapoScraper, DEFAULT_LISTING_URL};
