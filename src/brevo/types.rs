// src/brevo/types.rs
//
// Normalized views of Brevo response payloads. The raw JSON is defensively
// flattened here, in one place, so the fallback rules stay unit-testable.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub plan_name: String,
    pub plan_type: String,
    pub credits: u64,
    pub used_credits: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub plan: PlanSummary,
    pub activity: ActivitySummary,
    pub last_updated: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub email_credits: u64,
    pub plan_end_date: String,
    pub sms_credits: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(rename = "emailsSent7Days")]
    pub emails_sent_7_days: u64,
    pub delivered: u64,
    pub delivered_percentage: f64,
    pub opened: u64,
    pub opened_percentage: f64,
    pub bounced: u64,
    pub bounced_percentage: f64,
    pub blocked: u64,
    pub blocked_percentage: f64,
    pub spam_complaints: u64,
}

fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn normalize_account(raw: &Value) -> AccountInfo {
    AccountInfo {
        email: str_field(raw, "email"),
        first_name: str_field(raw, "firstName"),
        last_name: str_field(raw, "lastName"),
        company_name: str_field(raw, "companyName"),
    }
}

/// Pick the relevant plan entry out of an account payload. The free tier
/// returns `plan` either as a single object or as an array of plan blocks;
/// in the array form the `free` or `sendLimit` entry is the one that carries
/// email credits.
pub fn plan_entry(account: &Value) -> Option<&Value> {
    match account.get("plan") {
        Some(Value::Array(entries)) => entries
            .iter()
            .find(|p| {
                matches!(
                    p.get("type").and_then(Value::as_str),
                    Some("free") | Some("sendLimit")
                )
            })
            .or_else(|| entries.first()),
        Some(plan @ Value::Object(_)) => Some(plan),
        _ => None,
    }
}

/// Epoch timestamps show up both as numbers and as numeric strings.
pub fn numeric_field(raw: &Value, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Free plans default to 300 monthly email credits when the account payload
/// omits them.
pub const DEFAULT_FREE_CREDITS: u64 = 300;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}
