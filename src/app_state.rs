//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The `AppState` holds the metrics
//! plugin handle, which in turn owns the metrics backend.
//!
//! The state is cheaply cloneable (the plugin handle is an `Arc`) so it can
//! be passed to each request handler without copying resources.

use crate::plugin::Promster;

/// Shared application state passed to all Axum handlers.
///
/// # Lifecycle
///
/// 1. Created once in `create_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub struct AppState {
    /// Metrics plugin; renders the `/metrics` page.
    promster: Promster,
}

impl AppState {
    // ---
    pub fn new(promster: Promster) -> Self {
        AppState { promster }
    }

    /// Get a reference to the metrics plugin.
    pub fn promster(&self) -> &Promster {
        // ---
        &self.promster
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{MetricsBackend, PromsterOptions};
    use crate::plugin::create_plugin;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_app_state_creation_and_clone() {
        // ---
        let promster =
            create_plugin(PromsterOptions::default().with_backend(MetricsBackend::Noop)).unwrap();

        let app_state = AppState::new(promster);
        let cloned = app_state.clone();

        assert_eq!(cloned.promster().render(), "");
        assert_eq!(app_state.promster().options().backend, MetricsBackend::Noop);
    }
}
