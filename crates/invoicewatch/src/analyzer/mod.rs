//! Document analysis: the analyzer interface, the Gemini-backed client, and
//! a timeout/retry wrapper.

mod error;
mod gemini;
pub mod prompt;
mod resilient;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::AnalyzeError;
pub use gemini::GeminiAnalyzer;
pub use resilient::{ResilientAnalyzer, DEFAULT_BACKOFF, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT};
pub use types::{Document, RawExtraction};

/// Extracts invoice fields and a compliance judgment from one document.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, document: &Document) -> Result<RawExtraction, AnalyzeError>;
}

#[async_trait]
impl<T: DocumentAnalyzer + ?Sized> DocumentAnalyzer for Arc<T> {
    async fn analyze(&self, document: &Document) -> Result<RawExtraction, AnalyzeError> {
        (**self).analyze(document).await
    }
}
