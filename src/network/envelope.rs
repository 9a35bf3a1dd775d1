//! Response envelope decoding.
//!
//! Most endpoints answer `{ "success": bool, "data": …, "error": … }`. A few
//! older role endpoints return the payload bare. Both shapes decode through
//! [`decode`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub const DEFAULT_REJECTION: &str = "La operación no pudo completarse";

/// Decode a 2xx body.
///
/// * `{"success": true, "data": X}` yields `X` (a missing `data` decodes from `null`)
/// * `{"success": false, …}` yields `Rejected` with `error`, then `message`
/// * anything else is decoded as `T` directly
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body)?
    };
    decode_value(value)
}

pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    if let Value::Object(map) = &value {
        match map.get("success") {
            Some(Value::Bool(true)) => {
                let data = map.get("data").cloned().unwrap_or(Value::Null);
                return Ok(serde_json::from_value(data)?);
            }
            Some(Value::Bool(false)) => {
                return Err(ApiError::Rejected(
                    text_field(&value, "error")
                        .or_else(|| text_field(&value, "message"))
                        .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
                ));
            }
            _ => {}
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Server-provided explanation inside a non-2xx body, if any.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    text_field(&value, "error")
        .or_else(|| text_field(&value, "message"))
        .or_else(|| text_field(&value, "detail"))
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TableStatus, WitnessStats};

    #[test]
    fn success_envelope_unwraps_data() {
        let stats: WitnessStats =
            decode(br#"{"success":true,"data":{"total_observations":4,"alerts":1,"progress":50}}"#)
                .unwrap();
        assert_eq!(stats.total_observations, 4);
        assert_eq!(stats.progress, 50.0);
    }

    #[test]
    fn success_without_data_decodes_null() {
        let v: Option<Value> = decode(br#"{"success":true}"#).unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn rejection_prefers_error_then_message() {
        let e = decode::<Value>(r#"{"success":false,"error":"Cédula duplicada"}"#.as_bytes()).unwrap_err();
        assert_eq!(e, ApiError::Rejected("Cédula duplicada".into()));
        let e = decode::<Value>(br#"{"success":false,"message":"No"}"#).unwrap_err();
        assert_eq!(e, ApiError::Rejected("No".into()));
        let e = decode::<Value>(br#"{"success":false}"#).unwrap_err();
        assert_eq!(e, ApiError::Rejected(DEFAULT_REJECTION.into()));
    }

    #[test]
    fn bare_payload_is_accepted() {
        let status: TableStatus = decode(br#"{"status":"abierta"}"#).unwrap();
        assert_eq!(status.status, "abierta");
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(decode::<Value>(b"<html>"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn error_message_reads_common_keys() {
        assert_eq!(error_message(br#"{"error":"x"}"#).as_deref(), Some("x"));
        assert_eq!(error_message(br#"{"detail":"y"}"#).as_deref(), Some("y"));
        assert_eq!(error_message(b"oops"), None);
    }
}
