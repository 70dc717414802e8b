use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::error::{BenchError, Result};

/// Answer produced by a TEXT2SPARQL endpoint for one question.
///
/// `qname` and `uri` are added by the collector when the question has an id.
/// Any further fields the endpoint returns are kept in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub dataset: String,
    pub question: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Failure of a single request attempt.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Connection refused, HTTP error status or timeout; worth retrying.
    #[error("{0}")]
    Transient(String),

    /// The endpoint answered with a payload that is not an answer record.
    #[error("invalid response: {0}")]
    Shape(String),
}

impl RequestError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RequestError::Transient(_))
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RequestError::Transient(format!("Read timed out: {}", e))
        } else if e.is_connect() {
            RequestError::Transient(format!("Connection error: {}", e))
        } else if e.is_status() {
            RequestError::Transient(format!("HTTP error: {}", e))
        } else if e.is_decode() {
            RequestError::Shape(e.to_string())
        } else {
            RequestError::Transient(format!("Request failed: {}", e))
        }
    }
}

/// HTTP client for a TEXT2SPARQL endpoint (`GET <url>?dataset=..&question=..`).
pub struct Text2SparqlClient {
    client: Client,
    url: String,
}

impl Text2SparqlClient {
    pub fn new(url: &str) -> Result<Self> {
        url::Url::parse(url)
            .map_err(|e| BenchError::Config(format!("Invalid endpoint URL {}: {}", url, e)))?;

        let client = Client::builder()
            .build()
            .map_err(|e| BenchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one question; `timeout` bounds this attempt only.
    pub async fn request(
        &self,
        dataset: &str,
        question: &str,
        timeout: Duration,
    ) -> std::result::Result<AnswerRecord, RequestError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("dataset", dataset), ("question", question)])
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RequestError::Shape(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_record_keeps_metadata() {
        let json = r#"{
            "dataset": "https://text2sparql.aksw.org/2025/dbpedia/",
            "question": "Is Berlin a city?",
            "query": "ASK {}",
            "endpoint": "http://localhost:8000",
            "model": "demo"
        }"#;
        let record: AnswerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.query, "ASK {}");
        assert!(record.qname.is_none());
        assert_eq!(record.metadata["model"], "demo");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["endpoint"], "http://localhost:8000");
        assert!(back.get("qname").is_none());
    }

    #[test]
    fn test_answer_record_requires_query() {
        let json = r#"{"dataset": "d", "question": "q"}"#;
        assert!(serde_json::from_str::<AnswerRecord>(json).is_err());
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(Text2SparqlClient::new("localhost without scheme").is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let client = Text2SparqlClient::new("http://127.0.0.1:9/").unwrap();
        let err = client
            .request("ds", "question?", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "unexpected error: {}", err);
    }
}
