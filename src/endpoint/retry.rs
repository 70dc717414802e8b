//! Bounded retry of one question against a TEXT2SPARQL endpoint.

use std::time::Duration;

use crate::endpoint::client::{AnswerRecord, RequestError, Text2SparqlClient};
use crate::endpoint::retry_log::RetryLog;

/// Retry settings for one run.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Timeout of each attempt.
    pub timeout: Duration,
    /// Retries after the initial attempt; 0 means a single attempt.
    pub max_retries: u32,
    /// Fixed pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            max_retries: 5,
            delay: Duration::from_secs(15),
        }
    }
}

/// Result of asking one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Answered(AnswerRecord),
    /// Left out of the output; the reason has already been logged.
    Skipped(String),
}

pub struct RetryingRequester<'a> {
    client: &'a Text2SparqlClient,
    policy: RetryPolicy,
    retry_log: &'a RetryLog,
}

impl<'a> RetryingRequester<'a> {
    pub fn new(client: &'a Text2SparqlClient, policy: RetryPolicy, retry_log: &'a RetryLog) -> Self {
        Self {
            client,
            policy,
            retry_log,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.url()
    }

    /// Ask one question. `label` names the question in log lines (its qname
    /// when available).
    ///
    /// Transient failures are retried up to `max_retries` times with a fixed
    /// delay; malformed responses skip the question immediately.
    pub async fn ask(&self, dataset: &str, question: &str, label: &str) -> Outcome {
        let mut counter: u32 = 0;

        loop {
            if counter > 0 {
                self.retry_log.retry(&format!(
                    "{} | Retrying ({}/{}) after {} seconds...",
                    label,
                    counter,
                    self.policy.max_retries,
                    self.policy.delay.as_secs()
                ));
                tokio::time::sleep(self.policy.delay).await;
            }

            match self.client.request(dataset, question, self.policy.timeout).await {
                Ok(record) => return Outcome::Answered(record),
                Err(RequestError::Shape(e)) => {
                    log::debug!("{} | {}", label, e);
                    log::error!("{} | validation error, skipping question", label);
                    return Outcome::Skipped(format!("invalid response: {}", e));
                }
                Err(RequestError::Transient(e)) => {
                    self.retry_log.retry(&format!("{} | {}", label, e));
                }
            }

            counter += 1;
            if counter > self.policy.max_retries {
                self.retry_log.skipped(&format!(
                    "{} | Maximum number of retries reached. Skipping question.",
                    label
                ));
                return Outcome::Skipped("maximum number of retries reached".to_string());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Local endpoint that fails `failures` times with 503, then answers.
    /// Returns its URL and a counter of received requests.
    pub(crate) async fn flaky_endpoint(failures: usize) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));

        async fn handler(
            State((hits, failures)): State<(Arc<AtomicUsize>, usize)>,
        ) -> Result<Json<serde_json::Value>, StatusCode> {
            let n = hits.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                return Err(StatusCode::SERVICE_UNAVAILABLE);
            }
            Ok(Json(serde_json::json!({
                "dataset": "https://example.org/ds/",
                "question": "Is it?",
                "query": "ASK { ?s ?p ?o }"
            })))
        }

        let app = Router::new()
            .route("/", get(handler))
            .with_state((hits.clone(), failures));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/", addr), hits)
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(5),
            max_retries,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let (url, hits) = flaky_endpoint(0).await;
        let client = Text2SparqlClient::new(&url).unwrap();
        let log = RetryLog::disabled();
        let requester = RetryingRequester::new(&client, fast_policy(3), &log);

        let outcome = requester.ask("https://example.org/ds/", "Is it?", "ex:q1-en").await;
        assert!(matches!(outcome, Outcome::Answered(ref r) if r.query == "ASK { ?s ?p ?o }"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let (url, hits) = flaky_endpoint(2).await;
        let client = Text2SparqlClient::new(&url).unwrap();
        let log = RetryLog::disabled();
        let requester = RetryingRequester::new(&client, fast_policy(2), &log);

        let outcome = requester.ask("ds", "q", "ex:q1-en").await;
        assert!(matches!(outcome, Outcome::Answered(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_makes_r_plus_one_attempts() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("retries.log");
        let log = RetryLog::open(log_path.to_str().unwrap()).unwrap();

        for retries in [0u32, 1, 3] {
            let (url, hits) = flaky_endpoint(usize::MAX).await;
            let client = Text2SparqlClient::new(&url).unwrap();
            let requester = RetryingRequester::new(&client, fast_policy(retries), &log);

            let outcome = requester.ask("ds", "q", "ex:q1-en").await;
            assert!(matches!(outcome, Outcome::Skipped(_)));
            assert_eq!(hits.load(Ordering::SeqCst), retries as usize + 1);
        }

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Retrying (1/3) after 0 seconds..."));
        assert!(content.contains("Retrying (3/3)"));
        assert!(!content.contains("Retrying (4/3)"));
        assert_eq!(content.matches("Maximum number of retries reached").count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(serde_json::json!({"unexpected": true})) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Text2SparqlClient::new(&format!("http://{}/", addr)).unwrap();
        let log = RetryLog::disabled();
        let requester = RetryingRequester::new(&client, fast_policy(5), &log);

        let outcome = requester.ask("ds", "q", "ex:q1-en").await;
        assert!(matches!(outcome, Outcome::Skipped(ref reason) if reason.contains("invalid response")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let app = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Text2SparqlClient::new(&format!("http://{}/", addr)).unwrap();
        let err = client
            .request("ds", "q", Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("Read timed out"));
    }
}
