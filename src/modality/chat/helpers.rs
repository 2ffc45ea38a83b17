use serde::Serialize;

/// Serialize a request body for the backend.
pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, crate::error::AppError> {
    serde_json::to_vec(value).map_err(|e| crate::error::AppError::Internal(e.to_string()))
}

/// Pull `error.type` and `error.message` out of an Anthropic error payload.
pub fn error_fields(value: &serde_json::Value) -> Option<(String, String)> {
    let error = value.get("error")?;
    let kind = error
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("error")
        .to_string();
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown error")
        .to_string();
    Some((kind, message))
}

/// HTTP status Anthropic documents for an `error.type`.
pub fn status_for_error_type(kind: &str) -> u16 {
    match kind {
        "invalid_request_error" => 400,
        "authentication_error" => 401,
        "permission_error" => 403,
        "not_found_error" => 404,
        "request_too_large" => 413,
        "rate_limit_error" => 429,
        "overloaded_error" => 529,
        _ => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_fields_from_anthropic_shape() {
        let v = json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}});
        assert_eq!(
            error_fields(&v),
            Some(("overloaded_error".to_string(), "Overloaded".to_string()))
        );
    }

    #[test]
    fn error_fields_absent() {
        assert_eq!(error_fields(&json!({"type": "ping"})), None);
    }

    #[test]
    fn error_type_status() {
        assert_eq!(status_for_error_type("overloaded_error"), 529);
        assert_eq!(status_for_error_type("rate_limit_error"), 429);
        assert_eq!(status_for_error_type("api_error"), 500);
        assert_eq!(status_for_error_type("something_new"), 500);
    }
}
