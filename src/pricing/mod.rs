pub mod normalize;
pub mod rate;

pub use normalize::normalize;
pub use rate::{RateProvider, DEFAULT_RATE_URL};
