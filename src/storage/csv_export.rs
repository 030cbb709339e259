use crate::models::ListingRecord;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write records as a BOM-prefixed UTF-8 CSV.
///
/// Rows go to a sibling temp file that is renamed over `path` once fully
/// flushed, so a failed export never leaves a truncated CSV behind.
pub fn export_csv(records: &[ListingRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        warn!("No listings to export, writing header only to {}", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let tmp_path = temp_path_for(path);
    if let Err(e) = write_rows(records, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move CSV into place at {}", path.display()))?;

    info!("💾 Saved {} listings to {}", records.len(), path.display());
    Ok(())
}

fn write_rows(records: &[ListingRecord], tmp_path: &Path) -> Result<()> {
    let file = File::create(tmp_path)
        .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }

    let out = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?;
    out.into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?
        .sync_all()
        .context("Failed to sync CSV to disk")?;
    Ok(())
}

/// Column names, in the order [`ListingRecord`] serializes its fields
pub const HEADER: [&str; 6] = [
    "Titulo",
    "Precio_Original_Texto",
    "Precio_CLP_Final",
    "Moneda_Origen",
    "Descuento",
    "Link",
];

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read records back from a CSV written by [`export_csv`]
pub fn read_csv(path: &Path) -> Result<Vec<ListingRecord>> {
    let bytes = fs::read(path).with_context(|| format!("Cannot find CSV file {}", path.display()))?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut reader = csv::ReaderBuilder::new().from_reader(body);
    reader
        .deserialize()
        .enumerate()
        .map(|(idx, row)| row.with_context(|| format!("Invalid row {} in {}", idx + 2, path.display())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyOrigin;

    fn sample() -> Vec<ListingRecord> {
        vec![
            ListingRecord {
                title: "Depto, vista al mar".to_string(),
                price_text_original: "UF 12,5".to_string(),
                price_amount_clp: 475_000,
                currency_origin: CurrencyOrigin::Uf,
                discount_text: "No".to_string(),
                link: "https://www.yapo.cl/depto/1".to_string(),
            },
            ListingRecord {
                title: "Pieza \"amoblada\"".to_string(),
                price_text_original: "Consultar".to_string(),
                price_amount_clp: 0,
                currency_origin: CurrencyOrigin::FormatError,
                discount_text: "-5%".to_string(),
                link: "No disponible".to_string(),
            },
        ]
    }

    #[test]
    fn test_export_writes_bom_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arriendos.csv");

        export_csv(&sample(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Titulo,Precio_Original_Texto,Precio_CLP_Final,Moneda_Origen,Descuento,Link")
        );
        assert_eq!(
            lines.next(),
            Some("\"Depto, vista al mar\",\"UF 12,5\",475000,UF,No,https://www.yapo.cl/depto/1")
        );
        assert!(!dir.path().join("arriendos.csv.tmp").exists());
    }

    #[test]
    fn test_read_back_matches_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("arriendos.csv");

        export_csv(&sample(), &path).unwrap();

        assert_eq!(read_csv(&path).unwrap(), sample());
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacio.csv");

        export_csv(&[], &path).unwrap();

        assert!(read_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.to_string().contains("Cannot find CSV file"));
    }

    #[test]
    fn test_failed_export_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arriendos.csv");
        export_csv(&sample(), &path).unwrap();

        // a directory squatting on the temp path makes the write fail
        fs::create_dir(dir.path().join("arriendos.csv.tmp")).unwrap();
        assert!(export_csv(&[], &path).is_err());

        assert_eq!(read_csv(&path).unwrap(), sample());
    }
}
