//! Parts catalog lookup.
//!
//! The catalog is a separate SQLite file produced by the supplier's export
//! and is strictly read-only for this application. Lookups are exact
//! matches on the article number; an article can have several sub-items
//! (execution variants) the user picks from.
//!
//! Table and column names follow the supplier's export schema
//! (`BR_Bauhandel` with German column headers), which this module treats
//! as an external contract.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Read-only handle on the supplier catalog database.
#[derive(Clone)]
pub struct Catalog {
    conn: Arc<Mutex<Connection>>,
}

/// One selectable sub-item of an article, for presenting choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVariant {
    pub article_no: String,
    pub sub_no: String,
    pub sub_label: String,
}

/// A full catalog row for a chosen article/sub-item pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub article_no: String,
    pub sub_no: String,
    pub sub_label: String,
    /// Unit price; a missing price in the export is treated as 0.00.
    pub price: f64,
    pub description: String,
}

impl Catalog {
    /// Opens the catalog file read-only.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        log::info!("Catalog opened at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an empty in-memory catalog. Intended for tests, which create
    /// and fill the table themselves.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }

    /// Returns the distinct sub-items for an exact article-number match,
    /// for user selection. An unknown article yields an empty list.
    pub fn search(&self, article_no: &str) -> Result<Vec<CatalogVariant>, DatabaseError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT \"ArtikelNr\", \"AFNr\", \"AF Bezeichnung\"
                 FROM BR_Bauhandel WHERE \"ArtikelNr\" = ?1",
            )?;
            let rows: Vec<CatalogVariant> = stmt
                .query_map(params![article_no], |row| {
                    Ok(CatalogVariant {
                        article_no: row.get(0)?,
                        sub_no: row.get(1)?,
                        sub_label: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Fetches the full row for a chosen article/sub-item pair.
    pub fn fetch(
        &self,
        article_no: &str,
        sub_no: &str,
    ) -> Result<Option<CatalogEntry>, DatabaseError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT \"ArtikelNr\", \"Preis\", \"Beschreibung\", \"AFNr\", \"AF Bezeichnung\"
                 FROM BR_Bauhandel WHERE \"ArtikelNr\" = ?1 AND \"AFNr\" = ?2",
            )?;
            let mut rows = stmt.query_map(params![article_no, sub_no], |row| {
                Ok(CatalogEntry {
                    article_no: row.get(0)?,
                    price: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                    description: row.get(2)?,
                    sub_no: row.get(3)?,
                    sub_label: row.get(4)?,
                })
            })?;
            match rows.next() {
                Some(Ok(row)) => Ok(Some(row)),
                Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
                None => Ok(None),
            }
        })
    }
}
