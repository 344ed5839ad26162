pub mod metrics;

// Re-export the factory functions for easy access
pub use self::metrics::{create_facade_metrics, create_metrics, create_noop_metrics, create_prom_metrics};
