// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod demo;
mod health;
mod metrics;
mod root;

// Core handlers
pub use health::health_check;
pub use self::metrics::{metrics_handler, PROMETHEUS_CONTENT_TYPE};
pub use root::root_handler;

// Demo handlers
pub use demo::{echo, slow};
