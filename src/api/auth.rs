// src/api/auth.rs
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::{get, post, serde::json::Json, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error, ok, ApiResult};
use crate::server::ServerState;

const SESSION_COOKIE: &str = "admin_session";

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub password: String,
}

/// Shared-password login. An exact match sets the HTTP-only session cookie
/// for a week; anything else, including a server with no password
/// configured, is rejected.
#[post("/auth", data = "<request>")]
pub async fn login(
    state: &State<ServerState>,
    cookies: &CookieJar<'_>,
    request: Json<AuthRequest>,
) -> ApiResult {
    match &state.auth.admin_password {
        Some(expected) if *expected == request.password => {
            let cookie = Cookie::build((SESSION_COOKIE, "true"))
                .http_only(true)
                .same_site(SameSite::Strict)
                .path("/")
                .max_age(rocket::time::Duration::weeks(1));
            cookies.add(cookie);
            ok(json!({ "success": true }))
        }
        _ => error(Status::Unauthorized, "Invalid password"),
    }
}

#[get("/auth")]
pub async fn session(cookies: &CookieJar<'_>) -> Json<Value> {
    let authenticated = cookies
        .get(SESSION_COOKIE)
        .map(|c| c.value() == "true")
        .unwrap_or(false);
    Json(json!({ "authenticated": authenticated }))
}
