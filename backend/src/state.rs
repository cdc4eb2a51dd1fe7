//! Application state management
//!
//! Shared state passed to all request handlers via Axum's state extraction.
//! Every field is an `Arc` (or Arc-backed), so cloning per request is cheap.

use crate::config::AppConfig;
use crate::generator::TextGenerator;
use crate::repositories::HealthStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Profile, plan and activity persistence
    pub store: Arc<dyn HealthStore>,
    /// Text generator used for plans and advice
    pub generator: Arc<dyn TextGenerator>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Renders `/metrics`; absent when no recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn HealthStore>,
        generator: Arc<dyn TextGenerator>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            generator,
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered by `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the store
    #[inline]
    pub fn store(&self) -> &dyn HealthStore {
        self.store.as_ref()
    }

    /// Get a reference to the text generator
    #[inline]
    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
