//! Backend REST API client.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process; cheap to clone.
//! - The bearer token is read from the injected [`crate::session::SessionHandle`]
//!   for every request.
//! - A 401 from any endpoint tears the session down and redirects to the
//!   login route through the injected [`crate::ui::Navigator`], regardless of
//!   what the caller does with the error.
//! - No retries. Every failure is returned to the caller as-is.
//!
//! # Response envelope
//!
//! Every endpoint answers `{ "success": bool, "data"?: T, "message"?: string }`,
//! modelled by [`ApiResponse`].
//!
//! # Example
//!
//! ```rust,ignore
//! use vastraverse_storefront::api::{ApiClient, ProductQuery};
//!
//! let api = ApiClient::new(&config.api, session, navigator)?;
//!
//! let products = api.products(&ProductQuery::default()).await?.into_data()?;
//! api.add_to_cart(products.products[0].id, 2).await?.into_ack()?;
//! ```

mod auth;
mod cart;
mod client;
mod orders;
mod products;
pub mod types;
mod wishlist;

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use types::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend refused the request with a business failure.
    ///
    /// Displays the backend's message verbatim so it can be shown to the
    /// shopper as-is.
    #[error("{message}")]
    Rejected {
        /// HTTP status, when the failure came with a non-2xx status.
        status: Option<u16>,
        /// Human-readable reason from the backend.
        message: String,
    },

    /// The backend rejected the session (HTTP 401). The session has already
    /// been torn down when this is returned.
    #[error("Session expired, please login again")]
    Unauthorized,

    /// A successful response did not carry the expected payload.
    #[error("Response missing data")]
    MissingData,

    /// JSON encoding or decoding failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// The backend's own explanation, if it gave one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether this error ended the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// The `{success, data, message}` envelope every endpoint responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend considers the call successful.
    pub success: bool,
    /// Payload, present on most successful reads.
    pub data: Option<T>,
    /// Human-readable message, typically present on failures.
    pub message: Option<String>,
}

/// Envelope for calls whose payload the client does not use.
pub type Ack = ApiResponse<serde_json::Value>;

impl<T> ApiResponse<T> {
    /// Unwrap the payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if `success` is false, or
    /// `ApiError::MissingData` if a successful response carries no payload.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(self.rejection());
        }
        self.data.ok_or(ApiError::MissingData)
    }

    /// Check that the call succeeded, ignoring any payload.
    ///
    /// Returns the backend's message, if any.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if `success` is false.
    pub fn into_ack(self) -> Result<Option<String>, ApiError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(self.rejection())
        }
    }

    fn rejection(self) -> ApiError {
        ApiError::Rejected {
            status: None,
            message: self.message.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_data() {
        let envelope: ApiResponse<Vec<String>> =
            serde_json::from_str(r#"{"success":true,"data":["sarees","kurtas"]}"#).unwrap();
        assert_eq!(envelope.into_data().unwrap(), vec!["sarees", "kurtas"]);
    }

    #[test]
    fn test_envelope_failure_keeps_message_verbatim() {
        let envelope: Ack =
            serde_json::from_str(r#"{"success":false,"message":"Insufficient stock"}"#).unwrap();
        let err = envelope.into_ack().unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock");
        assert_eq!(err.backend_message(), Some("Insufficient stock"));
    }

    #[test]
    fn test_envelope_failure_without_message() {
        let envelope: Ack = serde_json::from_str(r#"{"success":false}"#).unwrap();
        let err = envelope.into_ack().unwrap_err();
        assert!(err.backend_message().is_none());
    }

    #[test]
    fn test_success_without_data() {
        let envelope: ApiResponse<u32> =
            serde_json::from_str(r#"{"success":true,"message":"ok"}"#).unwrap();
        assert!(matches!(envelope.into_data(), Err(ApiError::MissingData)));

        let envelope: Ack =
            serde_json::from_str(r#"{"success":true,"message":"Cart cleared"}"#).unwrap();
        assert_eq!(envelope.into_ack().unwrap().as_deref(), Some("Cart cleared"));
    }

    #[test]
    fn test_null_data_is_none() {
        let envelope: Ack = serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_unauthorized_display() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert_eq!(
            ApiError::Unauthorized.to_string(),
            "Session expired, please login again"
        );
    }
}
