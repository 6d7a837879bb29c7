//! Shared-expense ledger backend.
//!
//! Splits group expenses between members and keeps a simplified ledger of who
//! owes whom. The binary in `main.rs` wires these modules into an Actix server.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
