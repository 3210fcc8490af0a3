// src/brevo/events.rs
//
// Transactional event feed and the statistics aggregated from it. Brevo's
// event payloads are loosely shaped (timestamps under three different keys,
// event names with several spellings), so the normalization rules live here
// with a fixed priority order instead of being guessed per call site.

use std::collections::HashMap;

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

use super::client::BrevoClient;
use super::error::BrevoError;
use super::types::percentage;

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub event: String,
    pub email: String,
    pub date: String,
    pub subject: String,
    pub from: String,
    pub tags: Vec<String>,
    #[serde(rename = "message-id")]
    pub message_id: String,
    pub ts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sending_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    pub events: Vec<EventRecord>,
    pub pagination: Pagination,
    pub last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionalStats {
    pub total_sent: u64,
    pub delivered: u64,
    pub delivered_rate: f64,
    pub trackable_opens: u64,
    pub trackable_open_rate: f64,
    pub estimated_opens: u64,
    pub unique_clickers: u64,
    pub click_rate: f64,
    pub bounced: u64,
    pub bounce_rate: f64,
    pub blocked: u64,
    pub blocked_rate: f64,
    pub complaints: u64,
    pub spam_complaints: u64,
}

/// Timestamp fallback order: `ts`, then `ts_event`, then `ts_epoch`. Each may
/// be a number or a numeric string.
fn event_timestamp(raw: &Value) -> Option<i64> {
    for key in ["ts", "ts_event", "ts_epoch"] {
        match raw.get(key) {
            Some(Value::Number(n)) => {
                if let Some(ts) = n.as_i64() {
                    return Some(ts);
                }
            }
            Some(Value::String(s)) => {
                if let Ok(ts) = s.parse() {
                    return Some(ts);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn normalize_event(raw: &Value) -> EventRecord {
    let ts = event_timestamp(raw);
    let date = ts
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string());

    let field = |key: &str, default: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };
    let opt_field = |key: &str| raw.get(key).and_then(Value::as_str).map(String::from);

    EventRecord {
        event: field("event", "unknown"),
        email: field("email", ""),
        date,
        subject: field("subject", "No Subject"),
        from: field("from", "Unknown"),
        tags: raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        message_id: field("messageId", ""),
        ts,
        template_id: raw.get("templateId").and_then(Value::as_i64),
        sending_ip: opt_field("sendingIp"),
        link: opt_field("link"),
        user_agent: opt_field("userAgent"),
        device_used: opt_field("deviceUsed"),
        mirror_link: opt_field("mirrorLink"),
        contact_id: raw.get("contactId").and_then(Value::as_i64),
        reason: opt_field("reason"),
    }
}

/// Count events per lowercased name and resolve the spelling variants Brevo
/// uses across plan tiers. The first matching synonym wins.
pub fn aggregate_events(events: &[Value]) -> TransactionalStats {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for event in events {
        let name = event
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_lowercase();
        *counts.entry(name).or_insert(0) += 1;
    }

    let first_of = |keys: &[&str]| -> u64 {
        keys.iter()
            .find_map(|k| counts.get(*k).copied())
            .unwrap_or(0)
    };

    let total_sent = first_of(&["request", "requests"]);
    // Derived figures never exceed the number of requests.
    let delivered = first_of(&["delivered"]).min(total_sent);
    let bounced = first_of(&["bounced", "bounce", "hardbounce"]);
    let blocked = first_of(&["blocked"]);
    let complaints = first_of(&["spam", "complaint"]);
    let trackable_opens = first_of(&["opened", "open", "first opening"]).min(total_sent);
    let unique_clickers = first_of(&["clicked", "click"]).min(total_sent);

    TransactionalStats {
        total_sent,
        delivered,
        delivered_rate: percentage(delivered, total_sent),
        trackable_opens,
        trackable_open_rate: percentage(trackable_opens, total_sent),
        estimated_opens: trackable_opens,
        unique_clickers,
        click_rate: percentage(unique_clickers, total_sent),
        bounced,
        bounce_rate: percentage(bounced, total_sent),
        blocked,
        blocked_rate: percentage(blocked, total_sent),
        complaints,
        spam_complaints: complaints,
    }
}

fn date_query(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(start) = start_date {
        if !start.is_empty() {
            query.push(("startDate", start.to_string()));
        }
    }
    if let Some(end) = end_date {
        if !end.is_empty() {
            query.push(("endDate", end.to_string()));
        }
    }
    query
}

impl BrevoClient {
    /// Fetch one page of transactional events, newest first.
    pub async fn events(
        &self,
        page: u32,
        limit: u32,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<EventsPage, BrevoError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let mut query = vec![
            ("limit", limit.to_string()),
            ("offset", ((page - 1) * limit).to_string()),
            ("sort", "desc".to_string()),
        ];
        query.extend(date_query(start_date, end_date));

        let raw = self.get_json("/smtp/statistics/events", &query).await?;
        let events: Vec<EventRecord> = raw
            .get("events")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(normalize_event).collect())
            .unwrap_or_default();

        let total = raw
            .get("totalEvents")
            .and_then(Value::as_u64)
            .unwrap_or(events.len() as u64);

        Ok(EventsPage {
            pagination: Pagination {
                current_page: page,
                total_pages: (total.max(1) as u32).div_ceil(limit),
                total,
                limit,
            },
            events,
            last_updated: Local::now().to_rfc3339(),
            note: None,
        })
    }

    /// Aggregate up to 1000 recent events into delivery/engagement counts.
    pub async fn transactional_stats(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<TransactionalStats, BrevoError> {
        let mut query = vec![("limit", "1000".to_string())];
        query.extend(date_query(start_date, end_date));

        let raw = self.get_json("/smtp/statistics/events", &query).await?;
        let events = raw
            .get("events")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(aggregate_events(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_fallback_order_is_ts_then_ts_event_then_ts_epoch() {
        assert_eq!(
            event_timestamp(&json!({ "ts": 10, "ts_event": 20 })),
            Some(10)
        );
        assert_eq!(event_timestamp(&json!({ "ts_event": 20 })), Some(20));
        assert_eq!(event_timestamp(&json!({ "ts_epoch": "30" })), Some(30));
        assert_eq!(event_timestamp(&json!({ "ts": "not-a-number" })), None);
        assert_eq!(event_timestamp(&json!({})), None);
    }

    #[test]
    fn normalize_defaults_missing_fields() {
        let record = normalize_event(&json!({}));
        assert_eq!(record.event, "unknown");
        assert_eq!(record.email, "");
        assert_eq!(record.subject, "No Subject");
        assert_eq!(record.from, "Unknown");
        assert_eq!(record.date, "Invalid Date");
        assert!(record.tags.is_empty());
        assert!(record.reason.is_none());
        assert!(record.template_id.is_none());
        assert!(record.link.is_none());
    }

    #[test]
    fn normalize_passes_through_delivery_detail_fields() {
        let record = normalize_event(&json!({
            "event": "clicked",
            "templateId": 7,
            "sendingIp": "185.41.28.109",
            "link": "https://example.com/offer",
            "userAgent": "Mozilla/5.0",
            "deviceUsed": "DESKTOP",
            "mirrorLink": "https://app.example.com/mirror/abc",
            "contactId": 4211,
        }));
        assert_eq!(record.template_id, Some(7));
        assert_eq!(record.sending_ip.as_deref(), Some("185.41.28.109"));
        assert_eq!(record.link.as_deref(), Some("https://example.com/offer"));
        assert_eq!(record.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(record.device_used.as_deref(), Some("DESKTOP"));
        assert_eq!(record.mirror_link.as_deref(), Some("https://app.example.com/mirror/abc"));
        assert_eq!(record.contact_id, Some(4211));

        // Absent detail fields are omitted from the serialized record.
        let empty = serde_json::to_value(normalize_event(&json!({}))).unwrap();
        assert!(empty.get("templateId").is_none());
        assert!(empty.get("template_id").is_none());
        assert!(empty.get("link").is_none());
    }

    #[test]
    fn normalize_formats_numeric_string_timestamps() {
        let record = normalize_event(&json!({
            "event": "delivered",
            "email": "a@x.com",
            "ts_event": "1755900000",
            "tags": ["newsletter"],
        }));
        assert_eq!(record.event, "delivered");
        assert_ne!(record.date, "Invalid Date");
        assert_eq!(record.ts, Some(1_755_900_000));
        assert_eq!(record.tags, vec!["newsletter".to_string()]);
    }

    #[test]
    fn aggregation_resolves_event_name_synonyms() {
        let events: Vec<Value> = [
            "request", "request", "request", "delivered", "delivered", "open", "hardbounce",
        ]
        .iter()
        .map(|name| json!({ "event": name }))
        .collect();

        let stats = aggregate_events(&events);
        assert_eq!(stats.total_sent, 3);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.delivered_rate, 66.67);
        assert_eq!(stats.trackable_opens, 1);
        assert_eq!(stats.bounced, 1);
        assert_eq!(stats.spam_complaints, 0);
    }

    #[test]
    fn delivered_and_opens_are_capped_at_total_sent() {
        let events: Vec<Value> = [
            "request", "delivered", "delivered", "delivered", "opened", "opened",
        ]
        .iter()
        .map(|name| json!({ "event": name }))
        .collect();

        let stats = aggregate_events(&events);
        assert_eq!(stats.total_sent, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.trackable_opens, 1);
        assert_eq!(stats.delivered_rate, 100.0);
    }

    #[test]
    fn empty_feed_aggregates_to_zeroes() {
        let stats = aggregate_events(&[]);
        assert_eq!(stats.total_sent, 0);
        assert_eq!(stats.delivered_rate, 0.0);
    }
}
