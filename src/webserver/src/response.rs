use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::error::ApiError;

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

// Uniform JSON body of every response.
// `data` carries the payload as an already JSON-encoded string, so clients
// decode it a second time to get the stored value back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct Envelope {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Envelope {
    pub fn ok() -> Self {
        Envelope {
            status: STATUS_OK.to_string(),
            error: None,
            data: None,
        }
    }

    pub fn with_data(data: String) -> Self {
        Envelope {
            data: Some(data),
            ..Envelope::ok()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope {
            status: STATUS_ERROR.to_string(),
            error: Some(message.into()),
            data: None,
        }
    }
}

impl From<&ApiError> for Envelope {
    fn from(err: &ApiError) -> Self {
        Envelope::error(err.to_string())
    }
}

// Which HTTP status codes error envelopes are sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMode {
    // Always 200, the error is only visible in the envelope
    #[default]
    Compat,
    // 400/404/405/500 depending on the error
    Strict,
}

impl StatusMode {
    fn status_for(self, err: &ApiError) -> StatusCode {
        match self {
            StatusMode::Compat => StatusCode::OK,
            StatusMode::Strict => err.strict_status(),
        }
    }
}

// Convert a handler outcome into the HTTP response sent to the client
pub fn respond(result: Result<Envelope, ApiError>, mode: StatusMode) -> HttpResponse {
    match result {
        Ok(envelope) => HttpResponse::Ok().json(envelope),
        Err(err) => HttpResponse::build(mode.status_for(&err)).json(Envelope::from(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let ok = serde_json::to_string(&Envelope::ok()).unwrap();
        assert_eq!(ok, r#"{"status":"ok"}"#);

        let err = serde_json::to_string(&Envelope::error("Wrong method")).unwrap();
        assert_eq!(err, r#"{"status":"error","error":"Wrong method"}"#);

        let data = serde_json::to_string(&Envelope::with_data("1".to_string())).unwrap();
        assert_eq!(data, r#"{"status":"ok","data":"1"}"#);
    }

    #[test]
    fn test_respond_status_modes() {
        let compat = respond(Err(ApiError::NotFound), StatusMode::Compat);
        assert_eq!(compat.status(), StatusCode::OK);

        let strict = respond(Err(ApiError::NotFound), StatusMode::Strict);
        assert_eq!(strict.status(), StatusCode::NOT_FOUND);

        let ok = respond(Ok(Envelope::ok()), StatusMode::Strict);
        assert_eq!(ok.status(), StatusCode::OK);
    }
}
