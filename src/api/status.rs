// src/api/status.rs
use rocket::{get, serde::json::Json, State};

use crate::models::CampaignState;
use crate::server::ServerState;

/// Live campaign snapshot, polled by the dashboard every second or two.
#[get("/status")]
pub async fn get_status(state: &State<ServerState>) -> Json<CampaignState> {
    Json(state.engine.status().await)
}
