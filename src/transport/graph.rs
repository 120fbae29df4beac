use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed provider response: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded provider error envelope (`{ "error": { ... } }`).
pub struct GraphApiError {
    pub message: String,
    pub kind: Option<String>,
    pub code: Option<i64>,
    pub subcode: Option<i64>,
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error_subcode: Option<i64>,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

/// Try to decode the provider's error envelope from a response body.
///
/// Returns `None` when the body is not an envelope; callers fall back to a
/// plain HTTP-status error in that case.
pub fn decode_error_envelope(body: &str) -> Option<GraphApiError> {
    let parsed: WireErrorEnvelope = serde_json::from_str(body).ok()?;
    Some(GraphApiError {
        message: parsed.error.message,
        kind: parsed.error.kind,
        code: parsed.error.code,
        subcode: parsed.error.error_subcode,
        fbtrace_id: parsed.error.fbtrace_id,
    })
}

#[derive(Debug, Deserialize)]
struct WireDeleteResponse {
    success: bool,
}

pub fn decode_delete_template_response(json: &str) -> Result<(), TransportError> {
    let parsed: WireDeleteResponse = serde_json::from_str(json)?;
    if !parsed.success {
        return Err(TransportError::Malformed(
            "delete response reported success=false without an error envelope",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_decodes_with_optional_fields() {
        let body = r#"
        {
          "error": {
            "message": "Invalid parameter",
            "type": "OAuthException",
            "code": 100,
            "error_subcode": 2388043,
            "fbtrace_id": "AbCdEf"
          }
        }
        "#;
        let err = decode_error_envelope(body).unwrap();
        assert_eq!(err.message, "Invalid parameter");
        assert_eq!(err.kind.as_deref(), Some("OAuthException"));
        assert_eq!(err.code, Some(100));
        assert_eq!(err.subcode, Some(2388043));

        let minimal = decode_error_envelope(r#"{"error":{"message":"nope"}}"#).unwrap();
        assert_eq!(minimal.message, "nope");
        assert_eq!(minimal.code, None);
    }

    #[test]
    fn non_envelope_bodies_decode_to_none() {
        assert!(decode_error_envelope("service unavailable").is_none());
        assert!(decode_error_envelope(r#"{"data":[]}"#).is_none());
    }

    #[test]
    fn delete_response_requires_success() {
        assert!(decode_delete_template_response(r#"{"success":true}"#).is_ok());
        assert!(matches!(
            decode_delete_template_response(r#"{"success":false}"#),
            Err(TransportError::Malformed(_))
        ));
        assert!(matches!(
            decode_delete_template_response("not json"),
            Err(TransportError::Json(_))
        ));
    }
}
