// src/api/mod.rs
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{json, Value};

pub mod auth;
pub mod brevo;
pub mod campaign;
pub mod recipients;
pub mod status;
pub mod test_email;

/// Handler result carrying an explicit HTTP status. Error bodies are short
/// human-readable strings under an `error` key, never stack traces.
pub type ApiResult = Custom<Json<Value>>;

pub fn ok(body: Value) -> ApiResult {
    Custom(Status::Ok, Json(body))
}

pub fn error(status: Status, message: &str) -> ApiResult {
    Custom(status, Json(json!({ "error": message })))
}
