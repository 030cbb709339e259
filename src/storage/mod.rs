pub mod csv_export;
pub mod sqlite;

pub use csv_export::export_csv;
pub use sqlite::{cheapest_listings, migrate_to_relational};

/// `1234567` -> `"1.234.567"`, the way prices are printed locally
pub fn format_clp(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clp() {
        assert_eq!(format_clp(0), "0");
        assert_eq!(format_clp(950), "950");
        assert_eq!(format_clp(475_000), "475.000");
        assert_eq!(format_clp(1_234_567), "1.234.567");
        assert_eq!(format_clp(-12_000), "-12.000");
    }
}
