//! The `{success, message?, ...payload}` response envelope.
//!
//! Every backend endpoint answers with this shape, reporting application
//! failures inside the body rather than via HTTP status. `success: false`
//! becomes [`CatalogError::Api`] carrying the server message verbatim.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CatalogError, GENERIC_FAILURE_MESSAGE};

/// Checks the envelope and deserializes the remaining payload fields.
///
/// Returns the payload together with the optional server message, which
/// callers surface as success feedback.
pub fn unwrap<T: DeserializeOwned>(body: Value) -> Result<(T, Option<String>), CatalogError> {
    let success = body
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| CatalogError::UnexpectedResponse {
            message: "response is missing the `success` flag".to_string(),
        })?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !success {
        return Err(CatalogError::Api {
            message: message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        });
    }

    let payload = serde_json::from_value(body)?;
    Ok((payload, message))
}

/// Payload for endpoints that only acknowledge a mutation.
#[derive(Debug, serde::Deserialize)]
pub struct Ack {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, serde::Deserialize)]
    struct Departments {
        departments: Vec<String>,
    }

    #[test]
    fn test_unwrap_success_payload() {
        let body = json!({"success": true, "departments": ["護理系", "資管系"]});
        let (payload, message) = unwrap::<Departments>(body).unwrap();
        assert_eq!(payload.departments.len(), 2);
        assert!(message.is_none());
    }

    #[test]
    fn test_unwrap_failure_carries_server_message() {
        let body = json!({"success": false, "message": "權限不足"});
        let err = unwrap::<Ack>(body).unwrap_err();
        match err {
            CatalogError::Api { message } => assert_eq!(message, "權限不足"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_failure_without_message_uses_fallback() {
        let body = json!({"success": false});
        let err = unwrap::<Ack>(body).unwrap_err();
        match err {
            CatalogError::Api { message } => assert_eq!(message, GENERIC_FAILURE_MESSAGE),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_rejects_non_envelope() {
        let body = json!({"items": []});
        assert!(matches!(
            unwrap::<Ack>(body),
            Err(CatalogError::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn test_unwrap_keeps_success_message() {
        let body = json!({"success": true, "message": "加入成功"});
        let (_, message) = unwrap::<Ack>(body).unwrap();
        assert_eq!(message.as_deref(), Some("加入成功"));
    }
}
