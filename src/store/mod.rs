// src/store/mod.rs
//
// Thin client for the remote JSON document that holds the whole recipient
// list. The store is one flat array: reads fetch the entire document and
// writes replace it wholesale. A concurrent writer between the GET and the
// PUT loses its append (last-write-wins); accepted for a single-operator
// tool.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Recipient, RecipientStatus};

/// Subscribe failures, split by phase so a read failure is never reported as
/// a write failure. The underlying cause is logged, not displayed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Recipient store not configured")]
    NotConfigured,

    #[error("Failed to fetch current data")]
    Fetch,

    #[error("Failed to save subscription")]
    Write,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("JSONSTORAGE_URL").ok().filter(|u| !u.is_empty()),
            api_key: std::env::var("JSONSTORAGE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Debug)]
pub enum SubscribeOutcome {
    Added(Recipient),
    AlreadySubscribed,
}

#[derive(Clone)]
pub struct RecipientStore {
    config: StoreConfig,
    client: Client,
}

impl RecipientStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Fetch the full recipient list. Every upstream problem (store not
    /// configured, network failure, empty body, malformed JSON) collapses to
    /// an empty list so the dashboard always renders.
    pub async fn list(&self) -> Vec<Recipient> {
        let Some(url) = &self.config.url else {
            warn!("Recipient store URL not configured, returning empty list");
            return Vec::new();
        };

        let body = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                response.text().await.unwrap_or_default()
            }
            Ok(response) => {
                warn!("Recipient store returned {}", response.status());
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to fetch recipients: {}", e);
                return Vec::new();
            }
        };

        parse_recipient_list(&body)
    }

    /// Append a subscriber unless the email is already present. The existing
    /// entry wins: re-subscribing is not an error and leaves the list
    /// untouched.
    pub async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, StoreError> {
        let (Some(url), Some(api_key)) = (&self.config.url, &self.config.api_key) else {
            return Err(StoreError::NotConfigured);
        };

        let current = self.client.get(url).send().await.map_err(|e| {
            warn!("Failed to fetch recipient document: {}", e);
            StoreError::Fetch
        })?;
        if !current.status().is_success() {
            warn!("Recipient store returned {} on fetch", current.status());
            return Err(StoreError::Fetch);
        }
        let mut recipients = parse_recipient_list(&current.text().await.unwrap_or_default());

        if recipients.iter().any(|r| r.email == email) {
            debug!("{} is already subscribed", email);
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        let recipient = Recipient {
            id: format!("subscribe-{}", chrono::Utc::now().timestamp_millis()),
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            status: RecipientStatus::Pending,
        };
        recipients.push(recipient.clone());

        let response = self
            .client
            .put(url)
            .query(&[("apiKey", api_key)])
            .json(&recipients)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to write recipient document: {}", e);
                StoreError::Write
            })?;
        if !response.status().is_success() {
            warn!("Recipient store returned {} on write", response.status());
            return Err(StoreError::Write);
        }

        Ok(SubscribeOutcome::Added(recipient))
    }
}

fn parse_recipient_list(body: &str) -> Vec<Recipient> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(_)) => serde_json::from_str(body).unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> RecipientStore {
        RecipientStore::new(StoreConfig {
            url: Some(format!("{}/v1/json/doc", server.uri())),
            api_key: Some("write-key".to_string()),
        })
    }

    #[tokio::test]
    async fn list_returns_stored_recipients() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/json/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "r1", "name": "Ana", "email": "a@x.com", "status": "pending" },
            ])))
            .mount(&server)
            .await;

        let recipients = store_for(&server).list().await;
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "a@x.com");
    }

    #[tokio::test]
    async fn list_tolerates_empty_and_malformed_documents() {
        for body in ["", "   ", "not json {", "{\"an\": \"object\"}"] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&server)
                .await;
            assert!(store_for(&server).list().await.is_empty(), "body: {body:?}");
        }
    }

    #[tokio::test]
    async fn list_is_empty_on_upstream_failure_or_missing_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        assert!(store_for(&server).list().await.is_empty());

        let unconfigured = RecipientStore::new(StoreConfig {
            url: None,
            api_key: None,
        });
        assert!(unconfigured.list().await.is_empty());
    }

    #[tokio::test]
    async fn subscribe_appends_and_replaces_the_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/json/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "r1", "name": "Ana", "email": "a@x.com", "status": "pending" },
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/json/doc"))
            .and(query_param("apiKey", "write-key"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = store_for(&server).subscribe("bo@x.com").await.unwrap();
        let SubscribeOutcome::Added(recipient) = outcome else {
            panic!("expected a new subscription");
        };
        assert!(recipient.id.starts_with("subscribe-"));
        assert_eq!(recipient.name, "bo");
        assert_eq!(recipient.status, RecipientStatus::Pending);
    }

    #[tokio::test]
    async fn subscribe_is_idempotent_for_known_emails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "r1", "name": "Ana", "email": "a@x.com", "status": "sent" },
            ])))
            .mount(&server)
            .await;
        // The document must not be rewritten.
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = store_for(&server).subscribe("a@x.com").await.unwrap();
        assert!(matches!(outcome, SubscribeOutcome::AlreadySubscribed));
    }

    #[tokio::test]
    async fn subscribe_surfaces_write_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = store_for(&server).subscribe("bo@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Write));
        assert_eq!(err.to_string(), "Failed to save subscription");
    }

    #[tokio::test]
    async fn subscribe_reports_read_failures_distinctly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        // The write must never be attempted when the read fails.
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = store_for(&server).subscribe("bo@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Fetch));
        assert_eq!(err.to_string(), "Failed to fetch current data");
    }
}
