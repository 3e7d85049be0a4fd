//! Stand-in model that echoes its input behind a fixed prefix.

use std::time::Duration;

use async_trait::async_trait;

use infercache_core::constants::TEMPLATE_PREFIX;
use infercache_core::error::Result;
use infercache_core::traits::InferenceModel;

/// Returns `"Processed text: {input}"`, optionally after a simulated delay.
#[derive(Clone, Debug, Default)]
pub struct TemplateModel {
    latency: Duration,
}

impl TemplateModel {
    /// Creates a model that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model that sleeps for `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// The simulated inference latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl InferenceModel for TemplateModel {
    async fn infer(&self, input: &str) -> Result<String> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(format!("{TEMPLATE_PREFIX}{input}"))
    }

    fn name(&self) -> &str {
        "template"
    }
}
