//! Authentication session holder.
//!
//! Owns the login, register and logout flows. Establishing or tearing down a
//! session is published through [`SessionHandle`], which is how the cart and
//! wishlist holders learn to fetch or reset.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use vastraverse_core::Email;

use crate::api::{ApiClient, Credentials, Registration, User};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::session::{Session, SessionHandle};
use crate::ui::{Navigator, routes};

/// Authentication session holder.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<AuthSessionInner>,
}

struct AuthSessionInner {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
}

impl AuthSession {
    /// Create a holder over `api`'s session.
    ///
    /// Any session restored from storage is already active.
    #[must_use]
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        if let Some(user) = api.session().user() {
            set_sentry_user(&user.id, Some(user.email.as_str()));
        }
        Self {
            inner: Arc::new(AuthSessionInner { api, navigator }),
        }
    }

    fn session(&self) -> &SessionHandle {
        self.inner.api.session()
    }

    /// Whether a shopper is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_active()
    }

    /// The signed-in shopper.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session().user()
    }

    /// Subscribe to login and logout.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session().subscribe()
    }

    // =========================================================================
    // Login / Register
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::MissingField` without
    /// contacting the backend if the input is malformed, and
    /// `AuthError::Api` if the backend refuses the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let credentials = Credentials {
            email: email.into_inner(),
            password: password.to_owned(),
        };
        let payload = self.inner.api.login(&credentials).await?.into_data()?;

        self.establish(payload.token, payload.user, "Logged in")
    }

    /// Create an account and log in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::MissingField` without
    /// contacting the backend if the input is malformed, and
    /// `AuthError::Api` if the backend refuses the registration.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let email = Email::parse(&registration.email)?;
        if registration.name.trim().is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if registration.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let registration = Registration {
            name: registration.name.trim().to_owned(),
            email: email.into_inner(),
            phone: registration.phone.filter(|p| !p.trim().is_empty()),
            address: registration.address.filter(|a| !a.trim().is_empty()),
            ..registration
        };
        let payload = self.inner.api.register(&registration).await?.into_data()?;

        self.establish(payload.token, payload.user, "Registered")
    }

    fn establish(&self, token: String, user: User, action: &str) -> Result<User, AuthError> {
        self.session().establish(Session::new(token, user.clone()))?;

        let user_id = user.id.to_string();
        set_sentry_user(&user_id, Some(user.email.as_str()));
        add_breadcrumb("auth", action, Some(&[("user_id", user_id.as_str())]));
        info!(user_id = %user.id, "{action}");

        Ok(user)
    }

    // =========================================================================
    // Logout / Profile
    // =========================================================================

    /// Log out.
    ///
    /// The backend is told best-effort; the local session is torn down and
    /// the shopper redirected home whether or not that call succeeds.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.is_authenticated()
            && let Err(e) = self
                .inner
                .api
                .logout()
                .await
                .and_then(crate::api::ApiResponse::into_ack)
        {
            warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }

        self.session().teardown();
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        self.inner.navigator.redirect(routes::HOME);
        info!("Logged out");
    }

    /// Re-read the shopper's profile and store it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if nobody is signed in, or
    /// `AuthError::Api` if the request fails.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<User, AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }

        let user = self.inner.api.profile().await?.into_data()?;
        self.session().update_user(user.clone())?;
        Ok(user)
    }
}
