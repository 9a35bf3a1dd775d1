//! Error types for the dashboard.
//!
//! `ApiError` covers everything a refresh cycle or a form submission can hit
//! on the network path; `ValidationError` covers client-side checks that stop
//! a submission before any request leaves the page.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (offline, CORS, aborted).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with 401. Session side effects have already run.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx envelope with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The body was not the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text for a user notification. Transport failures collapse into the
    /// generic connection message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => crate::constants::MSG_CONNECTION_ERROR.to_string(),
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Http { status, .. } => format!("Error del servidor ({})", status),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl From<ApiError> for JsValue {
    fn from(e: ApiError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Failure of one refresh cycle: either the fetch or the paint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("render failed: {0}")]
    Render(String),
}

impl From<JsValue> for RefreshError {
    fn from(e: JsValue) -> Self {
        RefreshError::Render(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
    }
}

impl RefreshError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RefreshError::Api(ApiError::Unauthorized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Este campo es requerido")]
    Required,
    #[error("Ingresa un email válido")]
    Email,
    #[error("Ingresa un teléfono válido")]
    Phone,
    #[error("Ingresa una cédula válida (8-10 dígitos)")]
    Cedula,
    #[error("Ingresa un número válido")]
    Number,
    /// Form-level check: one or more required fields are empty.
    #[error("{0}")]
    MissingFields(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_hides_transport_details() {
        let e = ApiError::Network("TypeError: Failed to fetch".into());
        assert_eq!(e.user_message(), "Error de conexión");
    }

    #[test]
    fn user_message_prefers_server_text() {
        let e = ApiError::Http { status: 500, message: "Mesa cerrada".into() };
        assert_eq!(e.user_message(), "Mesa cerrada");
        let e = ApiError::Http { status: 502, message: String::new() };
        assert_eq!(e.user_message(), "Error del servidor (502)");
        assert_eq!(ApiError::Rejected("Duplicado".into()).user_message(), "Duplicado");
    }
}
