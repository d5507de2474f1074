//! API handlers.

pub mod audit;
pub mod catalog;
pub mod health;
pub mod items;
pub mod session;

/// Default page size for list endpoints.
pub(crate) fn default_limit() -> usize {
    50
}

/// Largest page a list endpoint will return.
pub(crate) const MAX_PAGE_SIZE: usize = 100;
