//! Explicit dependency container for the session manager and API client.
//!
//! Nothing in the crate reaches for a global session. Whatever composes the
//! application builds an `AppContext`, and consumers ask it for the pieces
//! they need; asking for something that was never supplied is a
//! configuration error rather than a panic.

use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::AuthSession;
use crate::config::Config;
use crate::models::{ServerReply, User, UserRole};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextError {
    #[error("No session manager was provided to this context")]
    MissingSession,

    #[error("No API client was provided to this context")]
    MissingApiClient,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("This action requires the {0} role")]
    RoleRequired(UserRole),
}

#[derive(Clone, Default)]
pub struct AppContext {
    session: Option<Arc<AuthSession>>,
    api: Option<ApiClient>,
}

#[derive(Default)]
pub struct AppContextBuilder {
    session: Option<Arc<AuthSession>>,
    api: Option<ApiClient>,
}

impl AppContextBuilder {
    pub fn session(mut self, session: Arc<AuthSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn api(mut self, api: ApiClient) -> Self {
        self.api = Some(api);
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            session: self.session,
            api: self.api,
        }
    }
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// Build the store, API client and session manager described by `config`,
    /// sharing one store between them, and restore any persisted session.
    pub fn compose(config: &Config) -> Result<Self> {
        let store = config.open_store().context("Failed to open session store")?;
        let api = ApiClient::new(config.api_base_url(), Arc::clone(&store))?;
        let session = Arc::new(AuthSession::new(store));
        session.bootstrap();

        Ok(Self::builder().session(session).api(api).build())
    }

    pub fn session(&self) -> Result<&Arc<AuthSession>, ContextError> {
        self.session.as_ref().ok_or(ContextError::MissingSession)
    }

    pub fn api(&self) -> Result<&ApiClient, ContextError> {
        self.api.as_ref().ok_or(ContextError::MissingApiClient)
    }

    // ===== Composite flows =====

    /// Authenticate against the backend and start a session with the result.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let api = self.api()?;
        let session = self.session()?;

        let reply = api.auth().login(email, password).await?.check()?;
        let token = reply
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("login reply has no token".to_string()))?;
        let user = reply
            .user
            .ok_or_else(|| ApiError::InvalidResponse("login reply has no user".to_string()))?;

        session.login(token, user.clone())?;
        Ok(user)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.session()?.logout()
    }

    /// Probe the profile endpoint with the persisted token.
    ///
    /// A 401 has already evicted the persisted token by the time it reaches
    /// here; the in-memory session is logged out to match and `Ok(false)` is
    /// returned.
    pub async fn verify_session(&self) -> Result<bool> {
        let api = self.api()?;
        let session = self.session()?;

        match api.auth().get_profile().await {
            Ok(reply) => {
                reply.check()?;
                Ok(true)
            }
            Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized) => {
                info!("Session rejected by server, logging out");
                if let Err(e) = session.logout() {
                    warn!(error = %e, "Failed to clear session after rejection");
                }
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ===== Role gates =====

    pub fn require_signed_in(&self) -> Result<User, ContextError> {
        self.session()?.user().ok_or(ContextError::NotSignedIn)
    }

    pub fn require_doctor(&self) -> Result<User, ContextError> {
        self.require_role(UserRole::Doctor)
    }

    pub fn require_patient(&self) -> Result<User, ContextError> {
        self.require_role(UserRole::Patient)
    }

    fn require_role(&self, role: UserRole) -> Result<User, ContextError> {
        let user = self.require_signed_in()?;
        if user.role == role {
            Ok(user)
        } else {
            Err(ContextError::RoleRequired(role))
        }
    }
}
