//! `/auth` endpoints.

use tracing::instrument;

use super::{Ack, ApiClient, ApiError, ApiResponse, AuthPayload, Credentials, Registration, User};

impl ApiClient {
    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<ApiResponse<AuthPayload>, ApiError> {
        self.post(self.url(&["auth", "login"])?, credentials).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<ApiResponse<AuthPayload>, ApiError> {
        self.post(self.url(&["auth", "register"])?, registration).await
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Ack, ApiError> {
        self.post(self.url(&["auth", "logout"])?, &serde_json::json!({}))
            .await
    }

    /// `GET /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<ApiResponse<User>, ApiError> {
        self.get(self.url(&["auth", "profile"])?).await
    }
}
