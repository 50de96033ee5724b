//! Business record storage.
//!
//! The local (non-proxied) reporting service and the mock POS instance read
//! businesses through `BusinessRepository`. The store is owned by the
//! process and injected; the dispatch layer never touches it.

pub mod memory;

use crate::models::Business;

pub use memory::MemoryStore;

/// Narrow read access to business records.
pub trait BusinessRepository: Send + Sync {
    fn get_by_id(&self, id: &str) -> Option<Business>;

    /// Businesses ordered by id, paged.
    fn list(&self, limit: usize, offset: usize) -> Vec<Business>;
}
