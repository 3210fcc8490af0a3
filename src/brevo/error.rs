// src/brevo/error.rs
use thiserror::Error;

/// Outcome classification for Brevo calls.
///
/// `MissingApiKey` and `InvalidSender` are configuration errors: they abort
/// the whole operation before anything is sent. The per-recipient variants
/// are translated from Brevo's `{code, message}` error body and recorded
/// without stopping a running campaign.
#[derive(Debug, Error)]
pub enum BrevoError {
    #[error("Brevo API key not configured")]
    MissingApiKey,

    #[error("Invalid sender email configuration")]
    InvalidSender,

    #[error("Invalid email parameters: {0}")]
    InvalidParameter(String),

    #[error("Brevo API key is invalid or expired")]
    Unauthorized,

    #[error("Sender email not verified in Brevo account")]
    UnverifiedSender,

    #[error("Brevo error: {0}")]
    Api(String),

    #[error("Brevo request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl BrevoError {
    /// Configuration errors block an operation entirely instead of being
    /// recorded per recipient.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidSender)
    }
}
