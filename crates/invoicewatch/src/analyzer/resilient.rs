use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{AnalyzeError, Document, DocumentAnalyzer, RawExtraction};
use crate::config::AnalyzerConfig;
use crate::sanitize::display_name;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Wraps an analyzer with a per-attempt deadline and a bounded retry on
/// transient failures. Non-transient errors propagate immediately.
pub struct ResilientAnalyzer<A> {
    inner: A,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl<A: DocumentAnalyzer> ResilientAnalyzer<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn from_config(inner: A, config: &AnalyzerConfig) -> Self {
        Self {
            inner,
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    async fn attempt(&self, document: &Document) -> Result<RawExtraction, AnalyzeError> {
        match tokio::time::timeout(self.timeout, self.inner.analyze(document)).await {
            Ok(result) => result,
            Err(_) => Err(AnalyzeError::Timeout {
                after: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl<A: DocumentAnalyzer> DocumentAnalyzer for ResilientAnalyzer<A> {
    async fn analyze(&self, document: &Document) -> Result<RawExtraction, AnalyzeError> {
        let mut attempt = 0;
        loop {
            match self.attempt(document).await {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        file = %display_name(&document.file_name),
                        attempt,
                        error = %e,
                        "Analyzer call failed, retrying"
                    );
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
