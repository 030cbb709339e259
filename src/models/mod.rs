use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored in `link` when no usable hyperlink was found
pub const LINK_UNAVAILABLE: &str = "No disponible";

/// Sentinel stored in `discount_text` when the listing carries no discount
pub const NO_DISCOUNT: &str = "No";

/// How a listing's price ended up in pesos
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyOrigin {
    Clp,
    Uf,
    ClpCorrected,
    FormatError,
    Unknown,
}

impl CurrencyOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyOrigin::Clp => "CLP",
            CurrencyOrigin::Uf => "UF",
            CurrencyOrigin::ClpCorrected => "CLP_CORRECTED",
            CurrencyOrigin::FormatError => "FORMAT_ERROR",
            CurrencyOrigin::Unknown => "UNKNOWN",
        }
    }

    /// True for the classifications that carry a zero amount
    pub fn is_failure(&self) -> bool {
        matches!(self, CurrencyOrigin::FormatError | CurrencyOrigin::Unknown)
    }
}

impl fmt::Display for CurrencyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Peso value of one UF, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRate(i64);

impl ReferenceRate {
    pub const DEFAULT: ReferenceRate = ReferenceRate(38_000);

    pub fn new(pesos_per_uf: i64) -> Self {
        Self(pesos_per_uf)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Default for ReferenceRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One normalized rental listing.
///
/// Field renames are the CSV header, which doubles as the contract between
/// the extraction and migration stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    #[serde(rename = "Titulo")]
    pub title: String,
    #[serde(rename = "Precio_Original_Texto")]
    pub price_text_original: String,
    #[serde(rename = "Precio_CLP_Final")]
    pub price_amount_clp: i64,
    #[serde(rename = "Moneda_Origen")]
    pub currency_origin: CurrencyOrigin,
    #[serde(rename = "Descuento")]
    pub discount_text: String,
    #[serde(rename = "Link")]
    pub link: String,
}

impl ListingRecord {
    pub fn has_discount(&self) -> bool {
        self.discount_text != NO_DISCOUNT
    }

    pub fn has_link(&self) -> bool {
        self.link != LINK_UNAVAILABLE
    }
}
