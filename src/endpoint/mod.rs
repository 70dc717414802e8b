//! TEXT2SPARQL endpoint access: HTTP client, bounded retry, retries log.

pub mod client;
pub mod retry;
pub mod retry_log;

pub use client::{AnswerRecord, RequestError, Text2SparqlClient};
pub use retry::{Outcome, RetryPolicy, RetryingRequester};
pub use retry_log::RetryLog;
