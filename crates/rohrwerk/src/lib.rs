pub mod builder;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod invoice;
pub mod logging;
pub mod model;
pub mod store;

pub use builder::{Draft, JobForm};
pub use catalog::{Catalog, CatalogEntry, CatalogVariant};
pub use config::{load_config, CompanyInfo, Config, ConfigError};
pub use db::{Database, DatabaseError};
pub use error::{RenderError, Result, RohrwerkError, ValidationError};
pub use invoice::{InvoiceRenderer, INVOICE_FILENAME, INVOICE_MIME};
pub use model::{ItemKind, ItemLine, Job, JobItem, JobSummary};
pub use store::{JobListFilter, JobStore};
