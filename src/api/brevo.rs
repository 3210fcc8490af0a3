// src/api/brevo.rs
use chrono::Local;
use rocket::form::FromForm;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::{get, serde::json::Json, State};
use serde_json::{json, Value};
use tracing::{error as log_error, warn};

use super::{error, ok, ApiResult};
use crate::brevo::{AccountInfo, EventsPage, Pagination, PlanInfo, StatisticsReport};
use crate::server::ServerState;

/// On-demand configuration check: live API key validation plus sender
/// verification against the account's sender list, so a misconfigured setup
/// is caught here instead of mid-campaign.
#[get("/brevo/test")]
pub async fn test_configuration(state: &State<ServerState>) -> ApiResult {
    match state.brevo.verify_configuration().await {
        Ok(()) => ok(json!({
            "success": true,
            "message": "Brevo configuration is valid",
            "senderEmail": state.brevo.config.sender_email,
        })),
        Err(e) => Custom(
            Status::InternalServerError,
            Json(json!({
                "success": false,
                "error": e.to_string(),
                "senderEmail": state.brevo.config.sender_email,
            })),
        ),
    }
}

#[get("/brevo/account")]
pub async fn account(state: &State<ServerState>) -> Result<Json<AccountInfo>, ApiResult> {
    state.brevo.account().await.map(Json).map_err(|e| {
        log_error!("Account lookup failed: {}", e);
        error(Status::InternalServerError, "Failed to fetch account information")
    })
}

#[get("/brevo/plan")]
pub async fn plan(state: &State<ServerState>) -> Result<Json<PlanInfo>, ApiResult> {
    state.brevo.plan().await.map(Json).map_err(|e| {
        log_error!("Plan lookup failed: {}", e);
        error(Status::InternalServerError, "Failed to fetch plan information")
    })
}

#[get("/brevo/statistics")]
pub async fn statistics(state: &State<ServerState>) -> Result<Json<StatisticsReport>, ApiResult> {
    state.brevo.statistics().await.map(Json).map_err(|e| {
        log_error!("Statistics lookup failed: {}", e);
        error(Status::InternalServerError, "Failed to fetch statistics")
    })
}

#[derive(Debug, FromForm)]
pub struct EventsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[field(name = "startDate")]
    pub start_date: Option<String>,
    #[field(name = "endDate")]
    pub end_date: Option<String>,
}

/// Paged transactional event feed. A provider failure degrades to an empty
/// page with an explanatory note so the dashboard keeps rendering.
#[get("/brevo/events?<query..>")]
pub async fn events(state: &State<ServerState>, query: EventsQuery) -> Json<EventsPage> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    match state
        .brevo
        .events(page, limit, query.start_date.as_deref(), query.end_date.as_deref())
        .await
    {
        Ok(events) => Json(events),
        Err(e) => {
            warn!("Event feed unavailable: {}", e);
            Json(EventsPage {
                events: Vec::new(),
                pagination: Pagination {
                    current_page: page,
                    total_pages: 0,
                    total: 0,
                    limit,
                },
                last_updated: Local::now().to_rfc3339(),
                note: Some("Event history is temporarily unavailable".to_string()),
            })
        }
    }
}

#[derive(Debug, FromForm)]
pub struct StatsQuery {
    #[field(name = "startDate")]
    pub start_date: Option<String>,
    #[field(name = "endDate")]
    pub end_date: Option<String>,
}

/// Aggregated delivery counters for a date range. When the provider feed is
/// down the totals are estimated from the local send tracker instead.
#[get("/brevo/transactional-stats?<query..>")]
pub async fn transactional_stats(state: &State<ServerState>, query: StatsQuery) -> Json<Value> {
    let start = query.start_date.as_deref();
    let end = query.end_date.as_deref();

    match state.brevo.transactional_stats(start, end).await {
        Ok(stats) => Json(json!({
            "statistics": stats,
            "lastUpdated": Local::now().to_rfc3339(),
            "dateRange": {
                "startDate": start.unwrap_or("All time"),
                "endDate": end.unwrap_or("Now"),
            },
            "source": "Calculated from events",
        })),
        Err(e) => {
            warn!("Falling back to local tracking for stats: {}", e);
            let local = state.tracker.read_stats().await;
            let sent = local.total_sent;
            Json(json!({
                "statistics": {
                    "totalSent": sent,
                    "delivered": (sent as f64 * 0.96).round() as u64,
                    "opens": (sent as f64 * 0.44).round() as u64,
                    "bounces": (sent as f64 * 0.002).round() as u64,
                    "blocked": (sent as f64 * 0.034).round() as u64,
                },
                "lastUpdated": local.last_updated,
                "dateRange": {
                    "startDate": start.unwrap_or("All time"),
                    "endDate": end.unwrap_or("Now"),
                },
                "source": "Estimated from local tracking",
            }))
        }
    }
}
