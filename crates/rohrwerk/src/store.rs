//! Job store — the persistence facade the UI talks to.
//!
//! Wraps the raw repository with domain types. Every write is
//! transactional; not-found is a benign outcome, never an error.

use chrono::NaiveDate;

use crate::db::job_repo::{self, JobFilter};
use crate::db::{Database, DatabaseError};
use crate::model::{format_date, ItemLine, Job, JobItem, JobSummary};

/// Filter for the job listing. Both date bounds are inclusive and every
/// field is optional; an empty filter returns all jobs.
#[derive(Debug, Default, Clone)]
pub struct JobListFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Persistent store for jobs and their line items.
#[derive(Clone)]
pub struct JobStore {
    db: Database,
}

impl JobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Lists jobs matching the filter, newest job date first.
    ///
    /// Returns exactly one summary per job (even with zero items), each
    /// carrying its item lines as structured data.
    pub fn list_jobs(&self, filter: &JobListFilter) -> Result<Vec<JobSummary>, DatabaseError> {
        let repo_filter = JobFilter {
            date_from: filter.date_from.map(format_date),
            date_to: filter.date_to.map(format_date),
            search: filter.search.clone(),
        };

        let job_rows = job_repo::query(&self.db, &repo_filter)?;
        let job_ids: Vec<String> = job_rows.iter().map(|r| r.job_id.clone()).collect();
        let item_rows = job_repo::items_for_jobs(&self.db, &job_ids)?;

        let mut summaries: Vec<JobSummary> = job_rows
            .iter()
            .map(|row| JobSummary {
                job: Job::from_row(row),
                items: Vec::new(),
            })
            .collect();

        // item_rows come back sorted by job_id; distribute them onto the
        // date-ordered summaries.
        for item in &item_rows {
            if let Some(summary) = summaries.iter_mut().find(|s| s.job.job_id == item.job_id) {
                summary.items.push(ItemLine {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    price: item.price,
                });
            }
        }

        Ok(summaries)
    }

    /// Fetches a single job with all of its items.
    ///
    /// Returns `Ok(None)` for an unknown identifier; a job without items
    /// comes back with an empty item list.
    pub fn get_job_details(
        &self,
        job_id: &str,
    ) -> Result<Option<(Job, Vec<JobItem>)>, DatabaseError> {
        let Some(job_row) = job_repo::find_by_job_id(&self.db, job_id)? else {
            return Ok(None);
        };

        let items = job_repo::items_for_job(&self.db, job_id)?
            .iter()
            .map(JobItem::from_row)
            .collect();

        Ok(Some((Job::from_row(&job_row), items)))
    }

    /// Persists a job and its items atomically.
    pub fn create_job(&self, job: &Job, items: &[JobItem]) -> Result<(), DatabaseError> {
        let job_row = job.to_row();
        let item_rows: Vec<_> = items.iter().map(|i| i.to_row(&job.job_id)).collect();

        job_repo::insert_with_items(&self.db, &job_row, &item_rows)?;
        log::info!(
            "Saved job {} with {} items, total {:.2}",
            job.job_id,
            items.len(),
            job.total_amount
        );
        Ok(())
    }

    /// Deletes a job and its items atomically.
    ///
    /// Deleting an unknown identifier is a no-op success (`false`).
    pub fn delete_job(&self, job_id: &str) -> Result<bool, DatabaseError> {
        let removed = job_repo::delete(&self.db, job_id)?;
        if removed {
            log::info!("Deleted job {}", job_id);
        } else {
            log::debug!("Delete of unknown job {} ignored", job_id);
        }
        Ok(removed)
    }
}
