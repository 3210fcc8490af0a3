// src/api/campaign.rs
use rocket::http::Status;
use rocket::{post, serde::json::Json, State};
use serde::Deserialize;
use serde_json::json;

use super::{error, ok, ApiResult};
use crate::campaign::CampaignMessage;
use crate::models::Recipient;
use crate::server::ServerState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    pub action: String,
    #[serde(default)]
    pub recipients: Option<Vec<Recipient>>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

/// Start or stop the campaign loop. `start` returns as soon as the loop is
/// spawned; progress is observed through `GET /status`.
#[post("/campaign", data = "<request>")]
pub async fn post_campaign(
    state: &State<ServerState>,
    request: Json<CampaignRequest>,
) -> ApiResult {
    let request = request.into_inner();
    match request.action.as_str() {
        "start" => {
            let message = CampaignMessage {
                subject: request.subject.unwrap_or_default(),
                html_content: request.html_content.unwrap_or_default(),
                sender_name: request.sender_name,
                reply_to: request.reply_to,
            };
            match state
                .engine
                .start(request.recipients.unwrap_or_default(), message)
                .await
            {
                Ok(()) => ok(json!({ "message": "Campaign started" })),
                Err(e) => error(Status::BadRequest, &e.to_string()),
            }
        }
        "stop" => {
            state.engine.stop().await;
            ok(json!({ "message": "Campaign stopped" }))
        }
        _ => error(Status::BadRequest, "Invalid action"),
    }
}
