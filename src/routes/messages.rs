// ============================================================================
// Messages Routes
// ============================================================================
//
// Endpoints:
// - POST /messages - Accept a message and enqueue it for persistence
// - GET /messages - Ordered conversation history for a participant pair
// - PATCH /messages/:message_id/read - Flip the read flag
//
// ============================================================================

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::broker::types::MessageEnvelope;
use crate::context::AppContext;
use crate::db;
use crate::error::AppError;

/// POST /messages body.
///
/// Fields default to empty strings so that absent and empty values fail the
/// same explicit validation instead of a framework-level rejection.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub receiver_id: String,
    #[serde(default)]
    pub content: String,
}

impl SendMessageRequest {
    /// Validate the request and convert it into a queue envelope
    fn into_envelope(self) -> Result<MessageEnvelope, AppError> {
        let envelope = MessageEnvelope::new(self.sender_id, self.receiver_id, self.content);
        envelope
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(envelope)
    }
}

/// GET /messages query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user1: Option<String>,
    pub user2: Option<String>,
}

impl HistoryParams {
    /// Both participants must be present and non-empty
    fn conversation_pair(&self) -> Result<(&str, &str), AppError> {
        match (self.user1.as_deref(), self.user2.as_deref()) {
            (Some(user1), Some(user2)) if !user1.is_empty() && !user2.is_empty() => {
                Ok((user1, user2))
            }
            _ => Err(AppError::validation(
                "Both user1 and user2 query parameters are required",
            )),
        }
    }
}

fn parse_message_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation("message id must be an integer"))
}

/// POST /messages
/// Accepts a send request, enqueues it durably, and acknowledges the caller
/// independent of persistence outcome: 202 means "durably queued," not
/// "visible to readers." There is no database interaction on this path.
pub async fn send_message(
    State(app_context): State<Arc<AppContext>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = request.into_envelope()?;

    if let Err(e) = app_context.publisher.publish(&envelope).await {
        tracing::error!(
            error = %e,
            sender_id = %envelope.sender_id,
            receiver_id = %envelope.receiver_id,
            "Failed to publish envelope"
        );
        return Err(AppError::broker(e.to_string()));
    }

    tracing::info!(
        sender_id = %envelope.sender_id,
        receiver_id = %envelope.receiver_id,
        "Message queued"
    );

    Ok((StatusCode::ACCEPTED, Json(json!({ "message": "queued" }))))
}

/// GET /messages?user1=&user2=
/// Ordered conversation history for the pair, in either orientation. An
/// empty conversation is a valid 200, not an error.
pub async fn get_messages(
    State(app_context): State<Arc<AppContext>>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let (user1, user2) = params.conversation_pair()?;

    let messages = db::conversation_between(&app_context.db_pool, user1, user2).await?;

    Ok(Json(messages))
}

/// PATCH /messages/:message_id/read
/// Marks a message as read. Succeeds whether or not the row exists; only a
/// non-integer id is an error.
pub async fn mark_read(
    State(app_context): State<Arc<AppContext>>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_message_id(&message_id)?;

    db::mark_message_read(&app_context.db_pool, id).await?;

    Ok(Json(json!({ "status": "read" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_requires_all_fields() {
        let request = SendMessageRequest {
            sender_id: "u1".to_string(),
            receiver_id: String::new(),
            content: "hi".to_string(),
        };
        assert!(request.into_envelope().is_err());

        let request = SendMessageRequest {
            sender_id: "u1".to_string(),
            receiver_id: "u2".to_string(),
            content: String::new(),
        };
        assert!(request.into_envelope().is_err());

        let request = SendMessageRequest {
            sender_id: "u1".to_string(),
            receiver_id: "u2".to_string(),
            content: "hi".to_string(),
        };
        let envelope = request.into_envelope().unwrap();
        assert_eq!(envelope.sender_id, "u1");
        assert_eq!(envelope.receiver_id, "u2");
    }

    #[test]
    fn test_history_params_require_both_users() {
        // Validation happens before any store access, so a missing or empty
        // parameter never reaches the database.
        let params = HistoryParams {
            user1: None,
            user2: Some("u2".to_string()),
        };
        assert!(params.conversation_pair().is_err());

        let params = HistoryParams {
            user1: Some("u1".to_string()),
            user2: Some(String::new()),
        };
        assert!(params.conversation_pair().is_err());

        let params = HistoryParams {
            user1: Some("u1".to_string()),
            user2: Some("u2".to_string()),
        };
        assert_eq!(params.conversation_pair().unwrap(), ("u1", "u2"));
    }

    #[test]
    fn test_message_id_must_be_integer() {
        assert!(parse_message_id("abc").is_err());
        assert!(parse_message_id("").is_err());
        assert!(parse_message_id("12.5").is_err());
        assert_eq!(parse_message_id("42").unwrap(), 42);
    }

    #[test]
    fn test_validation_failures_map_to_bad_request() {
        let err = parse_message_id("abc").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let params = HistoryParams {
            user1: None,
            user2: None,
        };
        let err = params.conversation_pair().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
