//! Text generation collaborators
//!
//! The plan and advice services only see the `TextGenerator` trait. The
//! production implementation talks to Gemini; tests substitute a stub.

use crate::config::AiConfig;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

mod gemini;

pub use gemini::GeminiGenerator;

/// Failures surfaced by a text generator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// Network failure, timeout or upstream 5xx; the request may be retried
    #[error("Text generator unavailable: {0}")]
    Transient(String),

    #[error("Text generator quota exceeded: {0}")]
    Quota(String),

    #[error("Text generator is not configured")]
    NotConfigured,
}

/// Produces free text for a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Generator used when no usable API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        Err(GeneratorError::NotConfigured)
    }
}

/// Build the generator described by `config`
///
/// Falls back to `DisabledGenerator` so the server still starts and serves
/// the calculators without a key.
pub fn from_config(config: &AiConfig) -> Arc<dyn TextGenerator> {
    if !config.enabled {
        warn!("AI generation disabled by configuration");
        return Arc::new(DisabledGenerator);
    }

    match GeminiGenerator::new(config) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            warn!(error = %e, "AI generation unavailable, plan and advice endpoints will return 503");
            Arc::new(DisabledGenerator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_generator_reports_not_configured() {
        let result = DisabledGenerator.generate("anything").await;
        assert_eq!(result, Err(GeneratorError::NotConfigured));
    }

    #[tokio::test]
    async fn test_missing_key_yields_disabled_generator() {
        let generator = from_config(&AiConfig::default());
        assert_eq!(
            generator.generate("prompt").await,
            Err(GeneratorError::NotConfigured)
        );
    }
}
