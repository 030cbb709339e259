use crate::models::ListingRecord;
use crate::storage::csv_export::read_csv;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

pub const TABLE: &str = "arriendos";

/// Prices at or below this are parse failures or placeholders, not rents
pub const PRICE_SANITY_FLOOR: i64 = 50_000;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS arriendos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT,
    precio_clp INTEGER,
    precio_original TEXT,
    moneda_origen TEXT,
    descuento TEXT,
    link_web TEXT,
    fecha_carga DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#;

const SQL_CHEAPEST: &str = r#"
SELECT titulo, precio_clp, moneda_origen
FROM arriendos
WHERE precio_clp > ?1
ORDER BY precio_clp ASC
LIMIT ?2
"#;

/// One row of the post-migration self-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheapestListing {
    pub title: String,
    pub price_clp: i64,
    pub currency_origin: String,
}

pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    conn.execute_batch(SCHEMA)
        .context("Failed to create arriendos table")?;
    Ok(conn)
}

/// Load the CSV into `arriendos`, replacing whatever the table held before.
/// Returns the number of rows inserted.
pub fn migrate_to_relational(csv_path: &Path, db_path: &Path) -> Result<usize> {
    let records = read_csv(csv_path)?;
    info!("📄 CSV loaded: {} records from {}", records.len(), csv_path.display());

    let mut conn = open(db_path)?;
    info!("✅ Table {} ready in {}", TABLE, db_path.display());

    let inserted = replace_all(&mut conn, &records)?;
    info!("💾 Inserted {} rows into {}", inserted, TABLE);

    Ok(inserted)
}

pub fn replace_all(conn: &mut Connection, records: &[ListingRecord]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to start transaction")?;

    tx.execute("DELETE FROM arriendos", [])
        .context("Failed to clear arriendos")?;
    // sqlite_sequence exists once any AUTOINCREMENT table has been created
    tx.execute("DELETE FROM sqlite_sequence WHERE name = ?1", params![TABLE])
        .context("Failed to reset arriendos ids")?;

    {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO arriendos (titulo, precio_clp, precio_original, moneda_origen, descuento, link_web)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;

        for record in records {
            stmt.execute(params![
                record.title,
                record.price_amount_clp,
                record.price_text_original,
                record.currency_origin.as_str(),
                record.discount_text,
                record.link,
            ])
            .with_context(|| format!("Failed to insert {:?}", record.title))?;
        }
    }

    tx.commit().context("Failed to commit migration")?;
    Ok(records.len())
}

/// The `limit` cheapest listings priced above [`PRICE_SANITY_FLOOR`]
pub fn cheapest_listings(conn: &Connection, limit: usize) -> Result<Vec<CheapestListing>> {
    let mut stmt = conn.prepare(SQL_CHEAPEST)?;

    let rows = stmt.query_map(params![PRICE_SANITY_FLOOR, limit as i64], |row| {
        Ok(CheapestListing {
            title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
            price_clp: row.get(1)?,
            currency_origin: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyOrigin;
    use crate::storage::csv_export::export_csv;

    fn record(title: &str, amount: i64, origin: CurrencyOrigin) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price_text_original: format!("$ {}", amount),
            price_amount_clp: amount,
            currency_origin: origin,
            discount_text: "No".to_string(),
            link: "No disponible".to_string(),
        }
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM arriendos", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_migration_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("arriendos.csv");
        let db_path = dir.path().join("inmobiliaria.db");

        export_csv(
            &[
                record("Uno", 300_000, CurrencyOrigin::Clp),
                record("Dos", 450_000, CurrencyOrigin::Clp),
            ],
            &csv_path,
        )
        .unwrap();
        assert_eq!(migrate_to_relational(&csv_path, &db_path).unwrap(), 2);

        export_csv(&[record("Tres", 500_000, CurrencyOrigin::Uf)], &csv_path).unwrap();
        assert_eq!(migrate_to_relational(&csv_path, &db_path).unwrap(), 1);

        let conn = open(&db_path).unwrap();
        assert_eq!(count(&conn), 1);
        let (id, titulo, moneda, fecha): (i64, String, String, Option<String>) = conn
            .query_row(
                "SELECT id, titulo, moneda_origen, fecha_carga FROM arriendos",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(titulo, "Tres");
        assert_eq!(moneda, "UF");
        assert!(fecha.is_some());
    }

    #[test]
    fn test_cheapest_listings_skips_near_zero_prices() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        replace_all(
            &mut conn,
            &[
                record("Error", 0, CurrencyOrigin::FormatError),
                record("Sospechoso", 50_000, CurrencyOrigin::Clp),
                record("Caro", 900_000, CurrencyOrigin::Clp),
                record("Barato", 250_000, CurrencyOrigin::Clp),
                record("Medio", 400_000, CurrencyOrigin::Uf),
                record("Alto", 600_000, CurrencyOrigin::Clp),
            ],
        )
        .unwrap();

        let cheapest = cheapest_listings(&conn, 3).unwrap();

        let titles: Vec<_> = cheapest.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Barato", "Medio", "Alto"]);
        assert_eq!(cheapest[1].currency_origin, "UF");
    }

    #[test]
    fn test_missing_csv_aborts_before_touching_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("inmobiliaria.db");

        assert!(migrate_to_relational(&dir.path().join("missing.csv"), &db_path).is_err());
        assert!(!db_path.exists());
    }
}
