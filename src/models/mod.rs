//! POS data model.
//!
//! # Data Flow
//! ```text
//! /reporting body
//!     → BusinessesRequest (validated by the service layer)
//!     → forwarded unchanged to an upstream /businesses instance
//!     → BusinessesResponse { business | err }
//!     → Business returned to the caller
//! ```
//!
//! The remaining records (checks, menu items, labor) mirror what a POS
//! provider exposes; they are carried so upstream payloads deserialize
//! into typed values.

pub mod business;
pub mod pos;

pub use business::{Business, BusinessesRequest, BusinessesResponse};
pub use pos::{Check, Employee, LaborEntry, MenuItem, MenuItemsRequest, MenuItemsResponse, OrderedItem};
