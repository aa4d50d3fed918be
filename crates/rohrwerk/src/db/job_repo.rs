//! Job repository — CRUD operations for the `jobs` and `job_items` tables.
//!
//! Jobs and their items are written and deleted together inside a single
//! transaction so that no partial record is ever visible.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub job_id: String,
    pub client_name: String,
    pub client_address: String,
    pub job_date: String,
    pub notes: String,
    pub total_amount: f64,
    pub created_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            job_id: row.get("job_id")?,
            client_name: row.get("client_name")?,
            client_address: row.get("client_address")?,
            job_date: row.get("job_date")?,
            notes: row.get("notes")?,
            total_amount: row.get("total_amount")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A raw job item row from the database.
#[derive(Debug, Clone)]
pub struct JobItemRow {
    pub job_id: String,
    pub kind: String,
    pub description: String,
    pub price: f64,
    pub quantity: f64,
}

impl JobItemRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            job_id: row.get("job_id")?,
            kind: row.get("type")?,
            description: row.get("description")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
        })
    }
}

/// Query filter parameters for job listing.
///
/// Date bounds are inclusive ISO date strings; `search` matches the client
/// name or the job identifier as a substring.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

/// Inserts a job row and all of its item rows in one transaction.
///
/// If any insert fails the whole write is rolled back; no partial job
/// remains visible.
pub fn insert_with_items(
    db: &Database,
    job: &JobRow,
    items: &[JobItemRow],
) -> Result<(), DatabaseError> {
    db.with_tx(|tx| {
        tx.execute(
            "INSERT INTO jobs (job_id, client_name, client_address, job_date, notes,
             total_amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                job.job_id,
                job.client_name,
                job.client_address,
                job.job_date,
                job.notes,
                job.total_amount,
                job.created_at,
            ],
        )?;

        for item in items {
            tx.execute(
                "INSERT INTO job_items (job_id, type, description, price, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.job_id,
                    item.kind,
                    item.description,
                    item.price,
                    item.quantity,
                ],
            )?;
        }

        Ok(())
    })
}

/// Finds a job by its identifier.
pub fn find_by_job_id(db: &Database, job_id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE job_id = ?1")?;
        let mut rows = stmt.query_map(params![job_id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Queries jobs with filters, ordered by job date descending (newest first),
/// falling back to the identifier for a stable order within one day.
pub fn query(db: &Database, filter: &JobFilter) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut conditions = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ref from) = filter.date_from {
            conditions.push(format!("job_date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(from.clone()));
        }
        if let Some(ref to) = filter.date_to {
            conditions.push(format!("job_date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(to.clone()));
        }
        if let Some(ref term) = filter.search {
            conditions.push(format!(
                "(client_name LIKE ?{n} OR job_id LIKE ?{n})",
                n = param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{}%", term)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM jobs {} ORDER BY job_date DESC, job_id DESC",
            where_clause
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<JobRow> = stmt
            .query_map(params_ref.as_slice(), JobRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    })
}

/// Fetches the items belonging to one job, in insertion order.
pub fn items_for_job(db: &Database, job_id: &str) -> Result<Vec<JobItemRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM job_items WHERE job_id = ?1 ORDER BY id")?;
        let rows: Vec<JobItemRow> = stmt
            .query_map(params![job_id], JobItemRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Fetches the items for a set of jobs with a single query.
///
/// Returns rows ordered by job identifier, then insertion order. The caller
/// groups them; an empty id list yields an empty result.
pub fn items_for_jobs(
    db: &Database,
    job_ids: &[String],
) -> Result<Vec<JobItemRow>, DatabaseError> {
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }

    db.with_conn(|conn| {
        let placeholders: Vec<String> =
            (1..=job_ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT * FROM job_items WHERE job_id IN ({}) ORDER BY job_id, id",
            placeholders.join(", ")
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> = job_ids
            .iter()
            .map(|id| id as &dyn rusqlite::types::ToSql)
            .collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<JobItemRow> = stmt
            .query_map(params_ref.as_slice(), JobItemRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Deletes a job and all of its items in one transaction.
///
/// Returns `true` if a job row was removed, `false` if the identifier was
/// unknown (a benign no-op, not an error).
pub fn delete(db: &Database, job_id: &str) -> Result<bool, DatabaseError> {
    db.with_tx(|tx| {
        tx.execute("DELETE FROM job_items WHERE job_id = ?1", params![job_id])?;
        let removed = tx.execute("DELETE FROM jobs WHERE job_id = ?1", params![job_id])?;
        Ok(removed > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_job(job_id: &str, date: &str) -> JobRow {
        JobRow {
            job_id: job_id.to_string(),
            client_name: "A. Muster".to_string(),
            client_address: "Musterstrasse 1\n8000 Zürich".to_string(),
            job_date: date.to_string(),
            notes: "".to_string(),
            total_amount: 220.0,
            created_at: "2026-01-01T08:00:00+00:00".to_string(),
        }
    }

    fn sample_item(job_id: &str, description: &str, price: f64, quantity: f64) -> JobItemRow {
        JobItemRow {
            job_id: job_id.to_string(),
            kind: "manual".to_string(),
            description: description.to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        let job = sample_job("j1", "2026-01-15");
        let items = vec![
            sample_item("j1", "Pipe repair", 50.0, 2.0),
            sample_item("j1", "Labor", 80.0, 1.5),
        ];
        insert_with_items(&db, &job, &items).unwrap();

        let found = find_by_job_id(&db, "j1").unwrap();
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.client_name, "A. Muster");
        assert_eq!(found.total_amount, 220.0);

        let items = items_for_job(&db, "j1").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Pipe repair");
        assert_eq!(items[1].quantity, 1.5);
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        let found = find_by_job_id(&db, "nonexistent").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_insert_is_atomic() {
        let db = test_db();
        let job = sample_job("atomic", "2026-01-15");

        // The second item references a different, nonexistent job and
        // violates the foreign key, so the whole write must roll back.
        let items = vec![
            sample_item("atomic", "Valve", 30.0, 1.0),
            sample_item("other-job", "Ghost item", 10.0, 1.0),
        ];
        let result = insert_with_items(&db, &job, &items);
        assert!(result.is_err());

        assert!(find_by_job_id(&db, "atomic").unwrap().is_none());
        assert!(items_for_job(&db, "atomic").unwrap().is_empty());
    }

    #[test]
    fn test_query_no_filter_orders_by_date_desc() {
        let db = test_db();
        insert_with_items(&db, &sample_job("old", "2026-01-01"), &[]).unwrap();
        insert_with_items(&db, &sample_job("new", "2026-03-01"), &[]).unwrap();
        insert_with_items(&db, &sample_job("mid", "2026-02-01"), &[]).unwrap();

        let rows = query(&db, &JobFilter::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].job_id, "new");
        assert_eq!(rows[1].job_id, "mid");
        assert_eq!(rows[2].job_id, "old");
    }

    #[test]
    fn test_query_date_range_inclusive() {
        let db = test_db();
        insert_with_items(&db, &sample_job("a", "2026-01-01"), &[]).unwrap();
        insert_with_items(&db, &sample_job("b", "2026-01-15"), &[]).unwrap();
        insert_with_items(&db, &sample_job("c", "2026-02-01"), &[]).unwrap();

        let rows = query(
            &db,
            &JobFilter {
                date_from: Some("2026-01-01".to_string()),
                date_to: Some("2026-01-15".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        // Both bounds inclusive.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job_id, "b");
        assert_eq!(rows[1].job_id, "a");
    }

    #[test]
    fn test_query_search_matches_client_or_job_id() {
        let db = test_db();
        let mut by_name = sample_job("20260101_080000_aaaaaa", "2026-01-01");
        by_name.client_name = "Hans Beispiel".to_string();
        insert_with_items(&db, &by_name, &[]).unwrap();
        insert_with_items(&db, &sample_job("20260102_090000_bbbbbb", "2026-01-02"), &[])
            .unwrap();

        // Substring of the client name.
        let rows = query(
            &db,
            &JobFilter {
                search: Some("Beispiel".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_id, "20260101_080000_aaaaaa");

        // Substring of the job identifier.
        let rows = query(
            &db,
            &JobFilter {
                search: Some("bbbbbb".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_id, "20260102_090000_bbbbbb");
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let db = test_db();
        insert_with_items(&db, &sample_job("ci", "2026-01-01"), &[]).unwrap();

        let rows = query(
            &db,
            &JobFilter {
                search: Some("muster".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_query_returns_jobs_without_items() {
        let db = test_db();
        insert_with_items(&db, &sample_job("empty", "2026-01-01"), &[]).unwrap();

        let rows = query(&db, &JobFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(items_for_job(&db, "empty").unwrap().is_empty());
    }

    #[test]
    fn test_items_for_jobs_groups_by_id() {
        let db = test_db();
        insert_with_items(
            &db,
            &sample_job("j1", "2026-01-01"),
            &[sample_item("j1", "One", 10.0, 1.0)],
        )
        .unwrap();
        insert_with_items(
            &db,
            &sample_job("j2", "2026-01-02"),
            &[
                sample_item("j2", "Two", 20.0, 1.0),
                sample_item("j2", "Three", 30.0, 1.0),
            ],
        )
        .unwrap();

        let rows = items_for_jobs(&db, &["j1".to_string(), "j2".to_string()]).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().filter(|r| r.job_id == "j2").count() == 2);

        let rows = items_for_jobs(&db, &[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_delete_removes_job_and_items() {
        let db = test_db();
        insert_with_items(
            &db,
            &sample_job("gone", "2026-01-01"),
            &[sample_item("gone", "Pipe", 10.0, 1.0)],
        )
        .unwrap();

        assert!(delete(&db, "gone").unwrap());
        assert!(find_by_job_id(&db, "gone").unwrap().is_none());
        assert!(items_for_job(&db, "gone").unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let db = test_db();
        assert!(!delete(&db, "never-existed").unwrap());
        // Deleting twice is equally benign.
        insert_with_items(&db, &sample_job("twice", "2026-01-01"), &[]).unwrap();
        assert!(delete(&db, "twice").unwrap());
        assert!(!delete(&db, "twice").unwrap());
    }
}
