use aula_core::AppError;
use thiserror::Error;

/// Failure talking to the hosted backend.
///
/// Every variant surfaces to clients as a 500. Nothing here is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Non-2xx response. `message` is the backend's `message` field when it
    /// sent one, otherwise the raw body.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error("store unreachable: {0}")]
    Transport(String),

    #[error("store call timed out")]
    Timeout,

    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_else(|| body.trim().to_string());
        StoreError::Status { status, message }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prefers_message_field() {
        let err = StoreError::status(409, r#"{"code":"23505","message":"duplicate key"}"#);
        match err {
            StoreError::Status { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_falls_back_to_body() {
        let err = StoreError::status(502, " bad gateway\n");
        assert_eq!(err.to_string(), "bad gateway (status 502)");
    }

    #[test]
    fn converts_to_internal_app_error() {
        let app: AppError = StoreError::Timeout.into();
        assert_eq!(app.status.as_u16(), 500);
        assert_eq!(
            app.detail(),
            "Error interno del servidor: store call timed out"
        );
    }
}
