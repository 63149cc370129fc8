//! Data layer: core types, loading, filtering, and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet          demo generator (seed 42)
//!        │                                │
//!        ▼                                ▼
//!   ┌──────────┐                    ┌──────────┐
//!   │  loader   │  parse file ────▶ │  Dataset  │  typed columns, rows,
//!   └──────────┘                    └──────────┘  distinct-value index
//!                                         │
//!                                         ▼
//!   ┌──────────┐                    ┌──────────┐
//!   │  filter   │  apply predicates │  export   │  filtered rows → CSV
//!   └──────────┘  → row indices ──▶ └──────────┘
//! ```

use thiserror::Error;

pub mod demo;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

/// Errors that can occur while loading tabular data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("{0}")]
    Malformed(String),
}
