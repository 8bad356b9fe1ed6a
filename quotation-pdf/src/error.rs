// quotation-pdf: error types

use thiserror::Error;

use crate::quotation::ValidationError;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("Failed to process image: {0}")]
    ImageError(String),
    #[error("Failed to load font: {0}")]
    FontError(String),
    #[error("Invalid page geometry: {0}")]
    PageGeometry(String),
    #[error("Nothing to export: the rendered document is empty")]
    EmptyRender,
    #[error("Failed to read configuration: {0}")]
    ConfigError(String),
    #[error("Failed to read items file: {0}")]
    ItemsError(String),
    #[error("Invalid item: {0}")]
    Validation(#[from] ValidationError),
    #[error("Export task failed: {0}")]
    TaskError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
