// src/server/routes.rs
// Additional route configurations; the API routes live in their own modules.

pub mod health {
    use rocket::{get, serde::json::Json};
    use serde_json::{json, Value};

    #[get("/health")]
    pub async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "campaign-dashboard-api"
        }))
    }

    #[get("/")]
    pub async fn index() -> Json<Value> {
        Json(json!({
            "name": "Campaign Dashboard API",
            "version": "0.1.0",
            "description": "API for running bulk email campaigns and tracking delivery",
            "endpoints": {
                "health": "/api/health",
                "status": "/api/status",
                "campaign": "/api/campaign",
                "recipients": "/api/recipients",
                "subscribe": "/api/subscribe",
                "auth": "/api/auth",
                "configTest": "/api/brevo/test",
                "account": "/api/brevo/account",
                "plan": "/api/brevo/plan",
                "statistics": "/api/brevo/statistics",
                "events": "/api/brevo/events",
                "transactionalStats": "/api/brevo/transactional-stats",
                "testEmail": "/api/test-email"
            }
        }))
    }
}
