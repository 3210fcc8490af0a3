// src/api/test_email.rs
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::{post, serde::json::Json, State};
use serde::Deserialize;
use serde_json::json;
use tracing::error as log_error;

use super::{ok, ApiResult};
use crate::campaign::OutboundEmail;
use crate::server::ServerState;

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One-off delivery check against the live provider, outside any campaign.
#[post("/test-email", data = "<request>")]
pub async fn send_test_email(
    state: &State<ServerState>,
    request: Json<TestEmailRequest>,
) -> ApiResult {
    let request = request.into_inner();
    let subject = request
        .subject
        .unwrap_or_else(|| "Test Email".to_string());
    let message = request
        .message
        .unwrap_or_else(|| "<p>This is a test email from the campaign dashboard.</p>".to_string());

    let email = OutboundEmail {
        to_email: request.email.clone(),
        to_name: request.email.clone(),
        subject,
        html_content: message,
        sender_name: None,
        reply_to: None,
    };

    match state.brevo.send_transactional(&email).await {
        Ok(response) => ok(json!({
            "success": true,
            "message": "Test email sent successfully",
            "messageId": response.message_id,
            "to": request.email,
            "from": state.brevo.config.sender_email,
        })),
        Err(e) => {
            log_error!("Test email to {} failed: {}", request.email, e);
            Custom(
                Status::InternalServerError,
                Json(json!({
                    "success": false,
                    "error": "Failed to send test email",
                    "details": e.to_string(),
                })),
            )
        }
    }
}
