// src/api/recipients.rs
use rocket::http::Status;
use rocket::{get, serde::json::Json, State};
use serde_json::{json, Value};
use tracing::error as log_error;

use super::{error, ok, ApiResult};
use crate::server::ServerState;
use crate::store::SubscribeOutcome;

/// The full recipient list from the remote store. Upstream failures render
/// as an empty list, never an error page.
#[get("/recipients")]
pub async fn get_recipients(state: &State<ServerState>) -> Json<Value> {
    Json(json!({ "recipients": state.store.list().await }))
}

/// Idempotent subscribe: appends the email to the remote list unless it is
/// already present.
#[get("/subscribe?<email>")]
pub async fn subscribe(state: &State<ServerState>, email: Option<String>) -> ApiResult {
    let Some(email) = email.filter(|e| !e.is_empty()) else {
        return error(Status::BadRequest, "Email is required");
    };
    if !email.contains('@') {
        return error(Status::BadRequest, "Invalid email format");
    }

    match state.store.subscribe(&email).await {
        Ok(SubscribeOutcome::AlreadySubscribed) => {
            ok(json!({ "message": "Email already subscribed", "email": email }))
        }
        Ok(SubscribeOutcome::Added(recipient)) => ok(json!({
            "message": "Successfully subscribed",
            "email": email,
            "recipient": recipient,
        })),
        Err(e) => {
            log_error!("Subscribe failed for {}: {}", email, e);
            error(Status::InternalServerError, &e.to_string())
        }
    }
}
