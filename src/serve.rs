//! Demonstration TEXT2SPARQL endpoint for local runs and tests.
//!
//! Answers every question about a known dataset with a fixed query.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

use crate::error::Result;

pub const KNOWN_DATASETS: &[&str] = &[
    "https://text2sparql.aksw.org/2025/dbpedia/",
    "https://text2sparql.aksw.org/2025/corporate/",
];

const DEMO_QUERY: &str = "SELECT ?s WHERE { ?s ?p ?o } LIMIT 10";

pub fn router() -> Router {
    Router::new()
        .route("/", get(handle_ask))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn run(host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    log::info!("Demo TEXT2SPARQL endpoint listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}

async fn handle_ask(Query(params): Query<HashMap<String, String>>) -> Response {
    let (Some(dataset), Some(question)) = (params.get("dataset"), params.get("question")) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "Missing parameter",
                "message": "Both 'dataset' and 'question' are required"
            })),
        )
            .into_response();
    };

    if !KNOWN_DATASETS.contains(&dataset.as_str()) {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Unknown dataset",
                "message": format!("Dataset '{}' is not served here", dataset)
            })),
        )
            .into_response();
    }

    log::debug!("Demo answer for {} ({})", question, dataset);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "dataset": dataset,
            "question": question,
            "query": DEMO_QUERY,
            "endpoint": "sparqlbench-demo"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::AnswerRecord;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_status(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_unprocessable() {
        assert_eq!(get_status("/").await.0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            get_status("/?dataset=https%3A%2F%2Ftext2sparql.aksw.org%2F2025%2Fdbpedia%2F").await.0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status("/?question=only%20question").await.0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_unknown_dataset() {
        let (status, _) = get_status("/?dataset=no-valid-dataset&question=x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_success_is_an_answer_record() {
        let (status, body) = get_status(
            "/?dataset=https%3A%2F%2Ftext2sparql.aksw.org%2F2025%2Fdbpedia%2F&question=Who%3F",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let record: AnswerRecord = serde_json::from_slice(&body).unwrap();
        assert_eq!(record.dataset, KNOWN_DATASETS[0]);
        assert_eq!(record.question, "Who?");
        assert_eq!(record.query, DEMO_QUERY);
    }
}
