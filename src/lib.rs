pub mod ad_sdk;
pub mod api;
pub mod config;
pub mod metrics;
pub mod placeholder;
pub mod retirement;
pub mod topics;
