use thiserror::Error;

#[derive(Error, Debug)]
pub enum RohrwerkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Rejected user input. Surfaced before any state change happens.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Client name must not be empty")]
    EmptyClientName,

    #[error("Item description must not be empty")]
    EmptyDescription,

    #[error("Price must be positive, got {0}")]
    NonPositivePrice(f64),

    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(f64),

    #[error("Hourly rate must be positive, got {0}")]
    NonPositiveRate(f64),

    #[error("Hours must be positive, got {0}")]
    NonPositiveHours(f64),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to generate PDF: {0}")]
    Pdf(String),

    #[error("No jobs selected for rendering")]
    EmptySelection,
}

pub type Result<T> = std::result::Result<T, RohrwerkError>;
