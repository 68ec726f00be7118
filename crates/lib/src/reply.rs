//! Reply service client (POST /api/chat, GET /health).
//!
//! The service is opaque: we send the new message plus the history and get back `{ "reply" }`,
//! or `{ "error" }` / arbitrary JSON with a non-success status.

use async_trait::async_trait;
use serde::Serialize;

use crate::chat_log::Message;

/// Reply text used when the service answers without one.
pub const EMPTY_REPLY: &str = "…";

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success status; the description is the best text we could pull out of the response.
    #[error("{0}")]
    Service(String),
}

/// Anything that can turn a message plus history into a reply.
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    async fn reply(&self, message: &str, history: &[Message]) -> Result<String, ReplyError>;
}

/// HTTP client for the reply service.
#[derive(Clone)]
pub struct ReplyClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    history: &'a [Message],
}

impl ReplyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the diagnostic endpoint, for front-ends that open it in a browser.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// POST /api/chat — one request, no retry.
    pub async fn send(&self, message: &str, history: &[Message]) -> Result<String, ReplyError> {
        let url = format!("{}/api/chat", self.base_url);
        log::debug!("reply: POST {} ({} history messages)", url, history.len());
        let res = self
            .client
            .post(&url)
            .json(&ChatRequest { message, history })
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            let description = describe_failure(status.as_u16(), &body);
            log::warn!("reply: service returned {}: {}", status, description);
            return Err(ReplyError::Service(description));
        }
        Ok(extract_reply(&body))
    }

    /// GET /health — returns whatever JSON the service reports about itself.
    pub async fn health(&self) -> Result<serde_json::Value, ReplyError> {
        let url = self.health_url();
        let res = self.client.get(&url).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ReplyError::Service(describe_failure(status.as_u16(), &body)));
        }
        serde_json::from_str(&body)
            .map_err(|e| ReplyError::Service(format!("invalid health JSON: {}", e)))
    }
}

#[async_trait]
impl ReplyBackend for ReplyClient {
    async fn reply(&self, message: &str, history: &[Message]) -> Result<String, ReplyError> {
        self.send(message, history).await
    }
}

/// Reply text from a success body: the `reply` field, else the placeholder.
fn extract_reply(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("reply").and_then(|r| r.as_str()).map(str::to_string))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

/// Description for a failed response: payload `error`, then the whole payload, then the status.
fn describe_failure(status: u16, body: &str) -> String {
    let payload = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(v) => v,
        Err(_) => return format!("HTTP {}", status),
    };
    match payload.get("error") {
        Some(v) if is_truthy(v) => match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        _ => payload.to_string(),
    }
}

/// JSON values that count as "set": not null, false, 0 or "".
fn is_truthy(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_prefers_error_field() {
        assert_eq!(describe_failure(500, r#"{"error":"boom"}"#), "boom");
    }

    #[test]
    fn failure_falls_back_to_payload_then_status() {
        assert_eq!(
            describe_failure(502, r#"{"detail":"upstream down"}"#),
            r#"{"detail":"upstream down"}"#
        );
        assert_eq!(describe_failure(503, "<html>Bad Gateway</html>"), "HTTP 503");
        assert_eq!(describe_failure(500, ""), "HTTP 500");
    }

    #[test]
    fn falsy_error_field_falls_back_to_payload() {
        assert_eq!(describe_failure(500, r#"{"error":false}"#), r#"{"error":false}"#);
        assert_eq!(describe_failure(500, r#"{"error":0}"#), r#"{"error":0}"#);
        assert_eq!(describe_failure(500, r#"{"error":""}"#), r#"{"error":""}"#);
        assert_eq!(describe_failure(500, r#"{"error":null}"#), r#"{"error":null}"#);
        assert_eq!(describe_failure(500, r#"{"error":{"code":7}}"#), r#"{"code":7}"#);
        assert_eq!(describe_failure(500, r#"{"error":42}"#), "42");
    }

    #[test]
    fn reply_placeholder_when_missing() {
        assert_eq!(extract_reply(r#"{"reply":"هلا وغلا"}"#), "هلا وغلا");
        assert_eq!(extract_reply(r#"{"reply":""}"#), EMPTY_REPLY);
        assert_eq!(extract_reply(r#"{}"#), EMPTY_REPLY);
        assert_eq!(extract_reply("not json"), EMPTY_REPLY);
    }

    #[test]
    fn base_url_trailing_slash_dropped() {
        let c = ReplyClient::new("http://localhost:3000/");
        assert_eq!(c.base_url(), "http://localhost:3000");
        assert_eq!(c.health_url(), "http://localhost:3000/health");
    }
}
