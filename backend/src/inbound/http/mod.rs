//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

pub mod balances;
pub mod error;
pub mod expenses;
pub mod health;
pub mod state;
pub mod validation;

pub use error::ApiResult;

/// JSON extractor configuration that reports malformed bodies as
/// `invalid_request` errors instead of Actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected malformed JSON body");
        Error::invalid_request("request body is not valid JSON for this endpoint")
            .with_details(json!({ "reason": err.to_string() }))
            .into()
    })
}

/// Register the versioned API handlers on a service config.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api/v1")
            .service(expenses::log_expense)
            .service(expenses::get_expense)
            .service(balances::balance_summary)
            .service(balances::list_balances),
    );
}
