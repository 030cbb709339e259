use crate::models::{CurrencyOrigin, ReferenceRate};

/// Above this many units a rent cannot be quoted in UF, so the number is
/// taken to be pesos already.
pub const UF_CEILING: f64 = 5000.0;

/// Result of normalizing one price token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPrice {
    pub amount_clp: i64,
    pub origin: CurrencyOrigin,
}

impl NormalizedPrice {
    fn failed(origin: CurrencyOrigin) -> Self {
        Self { amount_clp: 0, origin }
    }
}

/// Normalize a raw price string such as `"UF 12,5"` or `"$ 350.000"` into pesos.
///
/// Chilean formatting is assumed: `.` groups thousands and `,` marks decimals.
/// The magnitude check runs before the UF marker check, so a mislabeled
/// `"UF 9.000"` is still read as pesos.
pub fn normalize(raw_text: &str, rate: ReferenceRate) -> NormalizedPrice {
    if raw_text.trim().is_empty() {
        return NormalizedPrice::failed(CurrencyOrigin::Unknown);
    }

    let Some(value) = parse_locale_number(raw_text) else {
        return NormalizedPrice::failed(CurrencyOrigin::FormatError);
    };

    if value > UF_CEILING {
        return NormalizedPrice {
            amount_clp: value.trunc() as i64,
            origin: CurrencyOrigin::ClpCorrected,
        };
    }

    if has_uf_marker(raw_text) {
        return NormalizedPrice {
            amount_clp: (value * rate.value() as f64).round() as i64,
            origin: CurrencyOrigin::Uf,
        };
    }

    NormalizedPrice {
        amount_clp: value.trunc() as i64,
        origin: CurrencyOrigin::Clp,
    }
}

fn parse_locale_number(raw_text: &str) -> Option<f64> {
    let token: String = raw_text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let token = token.replace('.', "").replacen(',', ".", 1);
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn has_uf_marker(raw_text: &str) -> bool {
    raw_text.to_uppercase().contains("UF")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate() -> ReferenceRate {
        ReferenceRate::new(38_000)
    }

    #[test]
    fn test_uf_price_is_converted_with_rate() {
        let price = normalize("UF 12,5", rate());
        assert_eq!(price.amount_clp, 475_000);
        assert_eq!(price.origin, CurrencyOrigin::Uf);
    }

    #[test]
    fn test_peso_price_with_thousands_separator() {
        let price = normalize("$ 350.000", rate());
        assert_eq!(price.amount_clp, 350_000);
        assert_eq!(price.origin, CurrencyOrigin::Clp);
    }

    #[test]
    fn test_large_value_overrides_uf_marker() {
        let price = normalize("UF 9.000", rate());
        assert_eq!(price.amount_clp, 9000);
        assert_eq!(price.origin, CurrencyOrigin::ClpCorrected);
    }

    #[test]
    fn test_large_value_without_marker_is_corrected() {
        let price = normalize("$ 450.000,75", rate());
        assert_eq!(price.amount_clp, 450_000);
        assert_eq!(price.origin, CurrencyOrigin::ClpCorrected);
    }

    #[test]
    fn test_uf_marker_is_case_insensitive() {
        let price = normalize("15 uf", rate());
        assert_eq!(price.amount_clp, 570_000);
        assert_eq!(price.origin, CurrencyOrigin::Uf);

        let price = normalize("Uf 0,5", ReferenceRate::new(37_001));
        assert_eq!(price.amount_clp, 18_501);
    }

    #[test]
    fn test_threshold_boundary_is_not_corrected() {
        let price = normalize("UF 5.000", rate());
        assert_eq!(price.origin, CurrencyOrigin::Uf);
        assert_eq!(price.amount_clp, 190_000_000);

        let price = normalize("5.000", rate());
        assert_eq!(price.origin, CurrencyOrigin::Clp);
        assert_eq!(price.amount_clp, 5000);
    }

    #[test]
    fn test_small_peso_value_is_truncated() {
        let price = normalize("$ 4.999,99", rate());
        assert_eq!(price.amount_clp, 4999);
        assert_eq!(price.origin, CurrencyOrigin::Clp);
    }

    #[test]
    fn test_empty_text_is_unknown() {
        assert_eq!(normalize("", rate()), NormalizedPrice::failed(CurrencyOrigin::Unknown));
        assert_eq!(normalize("   ", rate()), NormalizedPrice::failed(CurrencyOrigin::Unknown));
    }

    #[test]
    fn test_text_without_number_is_format_error() {
        let price = normalize("Precio a convenir", rate());
        assert_eq!(price, NormalizedPrice::failed(CurrencyOrigin::FormatError));
        assert!(price.origin.is_failure());
    }

    #[test]
    fn test_multiple_decimal_separators_is_format_error() {
        let price = normalize("1,2,3", rate());
        assert_eq!(price, NormalizedPrice::failed(CurrencyOrigin::FormatError));
    }

    #[test]
    fn test_lone_separator_is_format_error() {
        assert_eq!(normalize("UF ,", rate()).origin, CurrencyOrigin::FormatError);
        assert_eq!(normalize("$ .", rate()).origin, CurrencyOrigin::FormatError);
    }

    #[test]
    fn test_normalize_is_pure() {
        let first = normalize("UF 23,75", rate());
        let second = normalize("UF 23,75", rate());
        assert_eq!(first, second);
        assert_eq!(first.amount_clp, 902_500);
    }
}
