//! SPARQL 1.1 protocol client and JSON result types.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BenchError, Result};

/// One bound value in a result row. Only the lexical value is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingValue {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRows {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, BindingValue>>,
}

/// Structured query result in the SPARQL JSON results format: ASK or SELECT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEndpointResult {
    Boolean { boolean: bool },
    Bindings { head: ResultHead, results: ResultRows },
}

impl RawEndpointResult {
    /// Canonical empty result used when an answer is missing or a query failed.
    pub fn empty() -> Self {
        RawEndpointResult::Bindings {
            head: ResultHead::default(),
            results: ResultRows::default(),
        }
    }
}

/// Client for a SPARQL endpoint holding the benchmark dataset.
pub struct SparqlClient {
    client: Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        url::Url::parse(endpoint)
            .map_err(|e| BenchError::Config(format!("Invalid SPARQL endpoint {}: {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a query, surfacing transport and decoding errors.
    pub async fn try_execute(&self, query: &str) -> Result<RawEndpointResult> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header("Accept", "application/sparql-results+json")
            .send()
            .await
            .map_err(|e| BenchError::Endpoint(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BenchError::Endpoint(format!("SPARQL endpoint error {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| BenchError::Endpoint(format!("Failed to parse SPARQL results: {}", e)))
    }

    /// Run a query; any failure is logged and yields the canonical empty result.
    pub async fn execute(&self, query: &str) -> RawEndpointResult {
        match self.try_execute(query).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Query against {} failed: {}", self.endpoint, e);
                RawEndpointResult::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boolean_result() {
        let raw: RawEndpointResult =
            serde_json::from_str(r#"{"head": {}, "boolean": true}"#).unwrap();
        assert_eq!(raw, RawEndpointResult::Boolean { boolean: true });
    }

    #[test]
    fn test_parse_bindings_result() {
        let json = r#"{
            "head": {"link": [], "vars": ["city"]},
            "results": {"distinct": false, "ordered": true, "bindings": [
                {"city": {"type": "uri", "value": "http://dbpedia.org/resource/Leipzig"}}
            ]}
        }"#;
        let raw: RawEndpointResult = serde_json::from_str(json).unwrap();
        match raw {
            RawEndpointResult::Bindings { head, results } => {
                assert_eq!(head.vars, vec!["city"]);
                assert_eq!(
                    results.bindings[0]["city"].value,
                    "http://dbpedia.org/resource/Leipzig"
                );
            }
            other => panic!("expected bindings, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_result_shape() {
        let json = serde_json::to_value(RawEndpointResult::empty()).unwrap();
        assert_eq!(json["head"]["vars"], serde_json::json!([]));
        assert_eq!(json["results"]["bindings"], serde_json::json!([]));
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(SparqlClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_empty() {
        let client = SparqlClient::new("http://127.0.0.1:9/sparql", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/sparql");
        assert!(client.try_execute("ASK {}").await.is_err());
        assert_eq!(client.execute("ASK {}").await, RawEndpointResult::empty());
    }
}
