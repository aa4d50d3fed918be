//! Domain types for jobs and their line items.
//!
//! Repository rows hold plain strings and numbers; the types here carry
//! parsed dates and the closed item-kind tag set. Conversions are lenient
//! when reading: a garbled stored value is logged and mapped to a safe
//! fallback instead of failing the whole listing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::job_repo::{JobItemRow, JobRow};

// ─── Helpers ────────────────────────────────────────────────────────────────

pub(crate) fn parse_date(s: &str, job_id: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|e| {
        log::warn!(
            "Invalid job date '{}' for job {}: {}. Defaulting to epoch date.",
            s,
            job_id,
            e
        );
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("parse_timestamp: failed to parse '{}': {}", s, e);
            Utc::now()
        })
}

pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ─── ItemKind ───────────────────────────────────────────────────────────────

/// Where a line item came from: the parts catalog, manual entry, or
/// labor hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Catalog,
    Manual,
    Work,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Catalog => "catalog",
            ItemKind::Manual => "manual",
            ItemKind::Work => "work",
        }
    }

    pub fn parse(s: &str, job_id: &str) -> Self {
        match s {
            "catalog" => ItemKind::Catalog,
            "manual" => ItemKind::Manual,
            "work" => ItemKind::Work,
            other => {
                log::warn!(
                    "Unknown item kind '{}' for job {}, defaulting to manual",
                    other,
                    job_id
                );
                ItemKind::Manual
            }
        }
    }
}

// ─── Job ────────────────────────────────────────────────────────────────────

/// One billable service engagement for a client.
///
/// Immutable after creation; `total_amount` equals the sum of the line
/// totals at save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique, creation-ordered identifier (timestamp prefix + random suffix).
    pub job_id: String,
    pub client_name: String,
    pub client_address: String,
    pub job_date: NaiveDate,
    pub notes: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Creates a `Job` from a database row.
    pub fn from_row(row: &JobRow) -> Self {
        Self {
            job_id: row.job_id.clone(),
            client_name: row.client_name.clone(),
            client_address: row.client_address.clone(),
            job_date: parse_date(&row.job_date, &row.job_id),
            notes: row.notes.clone(),
            total_amount: row.total_amount,
            created_at: parse_timestamp(&row.created_at),
        }
    }

    pub(crate) fn to_row(&self) -> JobRow {
        JobRow {
            job_id: self.job_id.clone(),
            client_name: self.client_name.clone(),
            client_address: self.client_address.clone(),
            job_date: format_date(self.job_date),
            notes: self.notes.clone(),
            total_amount: self.total_amount,
            created_at: format_timestamp(self.created_at),
        }
    }
}

// ─── JobItem ────────────────────────────────────────────────────────────────

/// One billable unit within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    pub kind: ItemKind,
    pub description: String,
    /// Unit price (the hourly rate for work items).
    pub price: f64,
    /// Fractional quantities are allowed (hours).
    pub quantity: f64,
}

impl JobItem {
    /// Line total for this item.
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity
    }

    /// Creates a `JobItem` from a database row.
    pub fn from_row(row: &JobItemRow) -> Self {
        Self {
            kind: ItemKind::parse(&row.kind, &row.job_id),
            description: row.description.clone(),
            price: row.price,
            quantity: row.quantity,
        }
    }

    pub(crate) fn to_row(&self, job_id: &str) -> JobItemRow {
        JobItemRow {
            job_id: job_id.to_string(),
            kind: self.kind.as_str().to_string(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}

// ─── Listing types ──────────────────────────────────────────────────────────

/// One item line in a job listing: the raw pieces, not pre-formatted text.
/// Display formatting is the presentation layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLine {
    pub description: String,
    pub quantity: f64,
    pub price: f64,
}

/// A job together with its item lines, as returned by the list operation.
/// Exactly one summary per job, even when it has no items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job: Job,
    pub items: Vec<ItemLine>,
}
