// src/campaign/engine.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{CampaignMailer, CampaignMessage, CancelToken, OutboundEmail, StartError};
use crate::models::{CampaignState, Recipient};
use crate::tracker::EmailTracker;

struct EngineInner {
    state: CampaignState,
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
}

/// Owns the single in-process send loop and its live status.
///
/// At most one loop is active per engine: `start` checks and flips
/// `is_running` under the same lock, so overlapping start requests cannot
/// race two loops into existence. The loop itself runs detached and reports
/// back through the shared state.
pub struct CampaignEngine {
    inner: Arc<Mutex<EngineInner>>,
    mailer: Arc<dyn CampaignMailer>,
    tracker: Arc<EmailTracker>,
    delay: Duration,
}

impl CampaignEngine {
    pub fn new(
        mailer: Arc<dyn CampaignMailer>,
        tracker: Arc<EmailTracker>,
        delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                state: CampaignState::default(),
                cancel: CancelToken::new(),
                task: None,
            })),
            mailer,
            tracker,
            delay,
        }
    }

    /// Kick off a campaign. Returns as soon as the loop is spawned; progress
    /// is observed via `status()`.
    pub async fn start(
        &self,
        recipients: Vec<Recipient>,
        message: CampaignMessage,
    ) -> Result<(), StartError> {
        let mut inner = self.inner.lock().await;
        if inner.state.is_running {
            return Err(StartError::AlreadyRunning);
        }
        if recipients.is_empty() {
            return Err(StartError::NoRecipients);
        }
        if message.subject.trim().is_empty() || message.html_content.trim().is_empty() {
            return Err(StartError::MissingContent);
        }
        self.mailer
            .preflight()
            .map_err(StartError::Configuration)?;

        info!("Starting campaign for {} recipients", recipients.len());
        inner.state = CampaignState {
            is_running: true,
            total: recipients.len(),
            ..CampaignState::default()
        };

        let cancel = CancelToken::new();
        inner.cancel = cancel.clone();
        inner.task = Some(tokio::spawn(run_loop(
            Arc::clone(&self.inner),
            Arc::clone(&self.mailer),
            Arc::clone(&self.tracker),
            cancel,
            recipients,
            message,
            self.delay,
        )));
        Ok(())
    }

    /// Request cancellation. The loop observes the token at the top of its
    /// next iteration; the in-flight send is not interrupted.
    pub async fn stop(&self) {
        let inner = self.inner.lock().await;
        inner.cancel.cancel();
        info!("Campaign stop requested");
    }

    pub async fn status(&self) -> CampaignState {
        self.inner.lock().await.state.clone()
    }
}

async fn run_loop(
    inner: Arc<Mutex<EngineInner>>,
    mailer: Arc<dyn CampaignMailer>,
    tracker: Arc<EmailTracker>,
    cancel: CancelToken,
    recipients: Vec<Recipient>,
    message: CampaignMessage,
    delay: Duration,
) {
    for recipient in recipients {
        if cancel.is_cancelled() {
            info!("Campaign cancelled, stopping before {}", recipient.email);
            break;
        }

        {
            let mut guard = inner.lock().await;
            guard.state.current_email = recipient.email.clone();
        }

        let email = OutboundEmail {
            to_email: recipient.email.clone(),
            to_name: recipient.name.clone(),
            subject: message.subject.clone(),
            html_content: message.html_content.replace("{name}", &recipient.name),
            sender_name: message.sender_name.clone(),
            reply_to: message.reply_to.clone(),
        };

        match mailer.send(&email).await {
            Ok(()) => {
                inner.lock().await.state.sent += 1;
                tracker.record_send().await;
            }
            Err(e) => {
                warn!("Failed to send to {}: {}", recipient.email, e);
                let mut guard = inner.lock().await;
                guard.state.failed += 1;
                guard
                    .state
                    .errors
                    .push(format!("Failed to send to {}: {}", recipient.email, e));
            }
        }

        tokio::time::sleep(delay).await;
    }

    let mut guard = inner.lock().await;
    guard.state.is_running = false;
    guard.state.current_email.clear();
    info!(
        sent = guard.state.sent,
        failed = guard.state.failed,
        "Campaign finished"
    );
}
