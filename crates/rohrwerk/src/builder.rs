//! Job builder — accumulates line items for one in-progress job entry.
//!
//! The draft is an explicit object with a create/mutate/commit-or-clear
//! lifecycle. It lives in memory only: a successful save clears it, a
//! failed save leaves it untouched so the user can retry, and it is lost
//! on process restart.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::CatalogEntry;
use crate::error::{RohrwerkError, ValidationError};
use crate::model::{ItemKind, Job, JobItem};
use crate::store::JobStore;

/// Validated client/job fields supplied by the UI for one save.
#[derive(Debug, Clone)]
pub struct JobForm {
    pub client_name: String,
    pub client_address: String,
    pub job_date: chrono::NaiveDate,
    pub notes: String,
}

/// A catalog-sourced draft item: the full catalog row plus a chosen quantity.
#[derive(Debug, Clone)]
pub struct CatalogDraftItem {
    pub entry: CatalogEntry,
    pub quantity: f64,
}

/// A manually entered draft item.
#[derive(Debug, Clone)]
pub struct ManualDraftItem {
    pub description: String,
    pub price: f64,
    pub quantity: f64,
}

/// A work-hours draft item.
#[derive(Debug, Clone)]
pub struct WorkDraftItem {
    pub description: String,
    pub rate: f64,
    pub hours: f64,
}

/// Transient accumulation of line items for a single job entry.
#[derive(Debug, Default, Clone)]
pub struct Draft {
    catalog_items: Vec<CatalogDraftItem>,
    manual_items: Vec<ManualDraftItem>,
    work_items: Vec<WorkDraftItem>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog item. The entry comes from a prior successful
    /// catalog lookup; the quantity must be positive.
    pub fn add_catalog_item(
        &mut self,
        entry: CatalogEntry,
        quantity: f64,
    ) -> Result<(), ValidationError> {
        if quantity <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        self.catalog_items.push(CatalogDraftItem { entry, quantity });
        Ok(())
    }

    /// Adds a manually entered item. Description must be non-empty, price
    /// and quantity positive.
    pub fn add_manual_item(
        &mut self,
        description: &str,
        price: f64,
        quantity: f64,
    ) -> Result<(), ValidationError> {
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if price <= 0.0 {
            return Err(ValidationError::NonPositivePrice(price));
        }
        if quantity <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        self.manual_items.push(ManualDraftItem {
            description: description.trim().to_string(),
            price,
            quantity,
        });
        Ok(())
    }

    /// Adds a work-hours item. Description must be non-empty, rate and
    /// hours positive (fractional hours allowed).
    pub fn add_work_item(
        &mut self,
        description: &str,
        rate: f64,
        hours: f64,
    ) -> Result<(), ValidationError> {
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if rate <= 0.0 {
            return Err(ValidationError::NonPositiveRate(rate));
        }
        if hours <= 0.0 {
            return Err(ValidationError::NonPositiveHours(hours));
        }
        self.work_items.push(WorkDraftItem {
            description: description.trim().to_string(),
            rate,
            hours,
        });
        Ok(())
    }

    pub fn catalog_items(&self) -> &[CatalogDraftItem] {
        &self.catalog_items
    }

    pub fn manual_items(&self) -> &[ManualDraftItem] {
        &self.manual_items
    }

    pub fn work_items(&self) -> &[WorkDraftItem] {
        &self.work_items
    }

    pub fn is_empty(&self) -> bool {
        self.catalog_items.is_empty() && self.manual_items.is_empty() && self.work_items.is_empty()
    }

    /// Subtotal of the catalog-sourced items.
    pub fn catalog_subtotal(&self) -> f64 {
        self.catalog_items
            .iter()
            .map(|i| i.entry.price * i.quantity)
            .sum()
    }

    /// Subtotal of the manually entered items.
    pub fn manual_subtotal(&self) -> f64 {
        self.manual_items
            .iter()
            .map(|i| i.price * i.quantity)
            .sum()
    }

    /// Subtotal of the work-hours items.
    pub fn work_subtotal(&self) -> f64 {
        self.work_items.iter().map(|i| i.rate * i.hours).sum()
    }

    /// Grand total across all three sources, recomputed from scratch.
    pub fn total(&self) -> f64 {
        self.catalog_subtotal() + self.manual_subtotal() + self.work_subtotal()
    }

    /// Discards all accumulated items (explicit cancel).
    pub fn clear(&mut self) {
        self.catalog_items.clear();
        self.manual_items.clear();
        self.work_items.clear();
    }

    /// Validates the form and turns the draft into a persistable job with
    /// its items, stamping the identifier and creation timestamp. The
    /// draft itself is not consumed.
    pub fn finish(&self, form: &JobForm) -> Result<(Job, Vec<JobItem>), ValidationError> {
        if form.client_name.trim().is_empty() {
            return Err(ValidationError::EmptyClientName);
        }

        let now = Utc::now();
        let mut items = Vec::with_capacity(
            self.catalog_items.len() + self.manual_items.len() + self.work_items.len(),
        );

        for item in &self.catalog_items {
            items.push(JobItem {
                kind: ItemKind::Catalog,
                description: format!(
                    "{} (AFNr: {} - {})",
                    item.entry.description, item.entry.sub_no, item.entry.sub_label
                ),
                price: item.entry.price,
                quantity: item.quantity,
            });
        }
        for item in &self.manual_items {
            items.push(JobItem {
                kind: ItemKind::Manual,
                description: item.description.clone(),
                price: item.price,
                quantity: item.quantity,
            });
        }
        for item in &self.work_items {
            items.push(JobItem {
                kind: ItemKind::Work,
                description: item.description.clone(),
                price: item.rate,
                quantity: item.hours,
            });
        }

        let job = Job {
            job_id: new_job_id(now),
            client_name: form.client_name.trim().to_string(),
            client_address: form.client_address.clone(),
            job_date: form.job_date,
            notes: form.notes.clone(),
            total_amount: self.total(),
            created_at: now,
        };

        Ok((job, items))
    }

    /// Commits the draft: validates, persists atomically, and clears the
    /// draft on success. On any failure the draft is retained so the user
    /// can fix the input or retry.
    pub fn save(&mut self, store: &JobStore, form: &JobForm) -> Result<String, RohrwerkError> {
        let (job, items) = self.finish(form)?;
        store.create_job(&job, &items)?;
        self.clear();
        Ok(job.job_id)
    }
}

/// Derives a new job identifier from the creation timestamp.
///
/// The second-granularity prefix keeps identifiers sortable by creation
/// order; the random suffix keeps two saves within the same second from
/// colliding.
fn new_job_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..6])
}
