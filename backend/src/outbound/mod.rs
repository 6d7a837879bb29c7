//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel and `bb8`.
//! - **memory**: in-process ledger store for development and tests.
//!
//! Adapters translate between domain values and storage representations and
//! hold no business rules; reconciliation lives in the domain.

pub mod memory;
pub mod persistence;
