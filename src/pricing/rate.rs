use crate::models::ReferenceRate;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_RATE_URL: &str = "https://mindicador.cl/api/uf";

#[derive(Error, Debug)]
pub enum RateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed indicator response: {0}")]
    Malformed(String),

    #[error("Indicator series is empty")]
    EmptySeries,
}

/// Body returned by the indicator service: a dated series, newest first
#[derive(Debug, Deserialize)]
pub struct IndicatorResponse {
    #[serde(alias = "series")]
    pub serie: Vec<IndicatorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct IndicatorEntry {
    #[serde(default, alias = "date")]
    pub fecha: Option<DateTime<Utc>>,
    #[serde(alias = "value")]
    pub valor: f64,
}

impl IndicatorResponse {
    /// Most recent entry of the series, rounded to whole pesos
    pub fn latest_rate(&self) -> Result<ReferenceRate, RateError> {
        let entry = self.serie.first().ok_or(RateError::EmptySeries)?;

        if !entry.valor.is_finite() || entry.valor <= 0.0 {
            return Err(RateError::Malformed(format!(
                "non-positive UF value {}",
                entry.valor
            )));
        }

        if let Some(fecha) = entry.fecha {
            debug!("Indicator entry dated {}", fecha.format("%Y-%m-%d"));
        }

        Ok(ReferenceRate::new(entry.valor.round() as i64))
    }
}

/// Fetches the day's UF rate once per run
pub struct RateProvider {
    client: Client,
    url: String,
}

impl RateProvider {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch the rate, falling back to [`ReferenceRate::DEFAULT`] on any failure
    pub async fn fetch_reference_rate(&self) -> ReferenceRate {
        match self.try_fetch().await {
            Ok(rate) => {
                info!("💱 UF rate for this run: ${}", rate.value());
                rate
            }
            Err(e) => {
                warn!(
                    "Could not fetch UF rate from {} ({}), using default ${}",
                    self.url,
                    e,
                    ReferenceRate::DEFAULT.value()
                );
                ReferenceRate::DEFAULT
            }
        }
    }

    async fn try_fetch(&self) -> Result<ReferenceRate, RateError> {
        debug!("Fetching UF rate from {}", self.url);

        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<IndicatorResponse>()
            .await?;

        body.latest_rate()
    }
}
