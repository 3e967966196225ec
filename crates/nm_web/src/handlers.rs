use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nm_core::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::mock::MockReport;
use crate::AppState;

/// An `nm_core::Error` rendered as `{"error": ..., "kind": ...}`. Client
/// mistakes are 400, everything else 500.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CountQuery {
    pub count: Option<String>,
}

fn parse_query_count(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("count must be an integer, got {:?}", raw)))
}

fn parse_body_count(body: &[u8]) -> Result<Option<i64>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("request body is not valid JSON: {}", e)))?;
    match value.get("count") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| Error::Validation(format!("count must be an integer, got {}", n))),
        Some(Value::String(s)) => parse_query_count(s).map(Some),
        Some(other) => Err(Error::Validation(format!("count must be an integer, got {}", other))),
    }
}

/// The query string wins over the body.
fn requested_count(query: &CountQuery, body: &[u8]) -> Result<Option<i64>> {
    match &query.count {
        Some(raw) => parse_query_count(raw).map(Some),
        None => parse_body_count(body),
    }
}

pub async fn generate_fake_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountQuery>,
    body: Bytes,
) -> std::result::Result<Json<MockReport>, ApiError> {
    let count = requested_count(&query, &body)
        .and_then(|requested| state.generator.validate_count(requested))
        .map_err(|e| {
            warn!(error = %e, "Rejected mock request");
            e
        })?;

    info!(count, "🧪 Generating mock articles");
    let report = state.generator.generate(count).await.map_err(|e| {
        error!(kind = e.kind(), error = %e, "Error generating mock articles");
        e
    })?;
    Ok(Json(report))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(count: &str) -> CountQuery {
        CountQuery {
            count: Some(count.to_string()),
        }
    }

    #[test]
    fn test_query_wins_over_body() {
        let count = requested_count(&query("3"), br#"{"count": 7}"#).unwrap();
        assert_eq!(count, Some(3));
    }

    #[test]
    fn test_body_count() {
        let none = CountQuery::default();
        assert_eq!(requested_count(&none, br#"{"count": 7}"#).unwrap(), Some(7));
        assert_eq!(requested_count(&none, br#"{"count": "8"}"#).unwrap(), Some(8));
        assert_eq!(requested_count(&none, b"").unwrap(), None);
        assert_eq!(requested_count(&none, b"{}").unwrap(), None);
        assert_eq!(requested_count(&none, br#"{"count": -2}"#).unwrap(), Some(-2));
    }

    #[test]
    fn test_non_integer_count_is_rejected() {
        let none = CountQuery::default();
        let bodies: [&[u8]; 3] = [br#"{"count": 2.5}"#, br#"{"count": true}"#, b"count=5"];
        for body in bodies {
            assert!(matches!(requested_count(&none, body), Err(Error::Validation(_))));
        }
        assert!(matches!(requested_count(&query("ten"), b""), Err(Error::Validation(_))));
        assert!(matches!(requested_count(&query(""), b""), Err(Error::Validation(_))));
    }
}
