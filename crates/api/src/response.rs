//! Shared response envelope for API handlers.
//!
//! Every success body is `{ "success": true, "message": ..., "data": ... }`.
//! Errors use the matching `{ success, message, code }` shape produced by
//! [`AppError`](crate::error::AppError).

use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok("Registration created", registration)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A success envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope with no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_serializes_data() {
        let json = serde_json::to_value(ApiResponse::ok("done", vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn message_only_omits_data() {
        let json = serde_json::to_value(ApiResponse::message("deleted")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }
}
