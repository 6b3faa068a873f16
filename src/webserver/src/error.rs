use actix_web::http::StatusCode;
use thiserror::Error;

// Every failure a request can end in. The Display strings are the messages
// clients see in the `error` field of the envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Wrong data")]
    WrongData,
    #[error("Key cannot be empty")]
    EmptyKey,
    #[error("Cannot find key")]
    NotFound,
    #[error("Wrong method")]
    WrongMethod,
    #[error("Internal storage error")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    // HTTP status used when the server runs with strict status codes
    pub fn strict_status(&self) -> StatusCode {
        match self {
            ApiError::WrongData | ApiError::EmptyKey => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::WrongMethod => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::WrongData.to_string(), "Wrong data");
        assert_eq!(ApiError::EmptyKey.to_string(), "Key cannot be empty");
        assert_eq!(ApiError::NotFound.to_string(), "Cannot find key");
        assert_eq!(ApiError::WrongMethod.to_string(), "Wrong method");

        let encode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ApiError::from(encode).to_string(), "Internal storage error");
    }

    #[test]
    fn test_strict_status() {
        assert_eq!(ApiError::WrongData.strict_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyKey.strict_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.strict_status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::WrongMethod.strict_status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
