use std::time::Duration;

use thiserror::Error;

/// Errors from a document analysis call.
///
/// Transient kinds (see [`AnalyzeError::is_transient`]) are worth one more
/// attempt; the rest mean the provider will not accept this document or
/// this configuration.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Analyzer did not answer within {}s", .after.as_secs_f32())]
    Timeout { after: Duration },

    #[error("Could not reach analyzer: {0}")]
    Transport(String),

    #[error("Analyzer returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Analyzer rejected the document: {0}")]
    Rejected(String),

    #[error("Analyzer response could not be read: {0}")]
    InvalidResponse(String),

    #[error("Document '{0}' is empty")]
    EmptyDocument(String),

    #[error("Analyzer misconfigured: {0}")]
    Config(String),
}

impl AnalyzeError {
    /// Timeouts, connection failures, rate limiting, and provider-side
    /// 5xx errors.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyzeError::Timeout { .. } | AnalyzeError::Transport(_) => true,
            AnalyzeError::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
