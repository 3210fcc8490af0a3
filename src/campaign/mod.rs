// src/campaign/mod.rs
//
// The campaign engine: a one-shot, cancellable broadcast of a single HTML
// message to an ordered recipient list, throttled by a fixed inter-send
// delay. The engine owns the loop task and the live status snapshot the
// dashboard polls.

pub mod cancel;
pub mod engine;

pub use cancel::CancelToken;
pub use engine::CampaignEngine;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::brevo::BrevoError;

/// The composed message a campaign broadcasts. `html_content` may contain
/// literal `{name}` tokens, substituted per recipient before dispatch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMessage {
    pub subject: String,
    pub html_content: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

/// One fully personalized email, ready for the provider. The sender address
/// itself is never part of this struct: it is fixed by configuration and
/// only the display name travels with the message.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html_content: String,
    pub sender_name: Option<String>,
    pub reply_to: Option<String>,
}

/// Dispatch seam between the engine and the delivery provider, so tests can
/// run campaigns against a recording double.
#[async_trait]
pub trait CampaignMailer: Send + Sync {
    /// Configuration check run once before the loop starts. An error here is
    /// fatal to the whole campaign.
    fn preflight(&self) -> Result<(), BrevoError>;

    async fn send(&self, email: &OutboundEmail) -> Result<(), BrevoError>;
}

/// Why a `start` command was rejected. No state changes when any of these
/// are returned.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("Campaign already running")]
    AlreadyRunning,

    #[error("No recipients provided")]
    NoRecipients,

    #[error("Subject and email content are required")]
    MissingContent,

    #[error("{0}")]
    Configuration(BrevoError),
}
