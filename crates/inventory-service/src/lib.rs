//! Inventory tracker HTTP API service.
//!
//! This crate provides the HTTP API for the inventory tracker, including:
//!
//! - Item creation with per-category, per-month UID allocation
//! - Item edits, transfers, status changes, and quantity reduction
//! - Location and project catalogs
//! - CSV export
//! - The audit log
//!
//! # Authentication
//!
//! Mutating requests need a bearer token of the form `test-token:<user-uuid>`.
//! Token issuance and validation live outside this service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers call the synchronous store

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod routes;
pub mod state;

pub use audit::AuditWriter;
pub use config::{ServiceConfig, StorageBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
