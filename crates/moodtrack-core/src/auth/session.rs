use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::{KeyValueStore, TOKEN_KEY, USER_KEY};
use crate::models::User;

/// The client's current belief about who is authenticated.
///
/// `is_logged_in` holds exactly when `token` is non-empty and `user` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_logged_in: bool,
    pub is_loading: bool,
    pub token: String,
    pub user: Option<User>,
}

impl Session {
    /// State at process start, before the persisted store has been read
    fn bootstrapping() -> Self {
        Self {
            is_loading: true,
            ..Self::logged_out()
        }
    }

    pub fn logged_out() -> Self {
        Self {
            is_logged_in: false,
            is_loading: false,
            token: String::new(),
            user: None,
        }
    }

    fn logged_in(token: String, user: User) -> Self {
        Self {
            is_logged_in: true,
            is_loading: false,
            token,
            user: Some(user),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Bootstrapping
        } else if self.is_logged_in {
            SessionPhase::LoggedIn
        } else {
            SessionPhase::LoggedOut
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Bootstrapping,
    LoggedOut,
    LoggedIn,
}

/// Owns the in-memory session and keeps the persisted store in step with it.
///
/// Constructed explicitly and shared through `Arc`. `bootstrap` must be called
/// once by whatever composes the application; until it completes the session
/// is not authoritative and `wait_ready` blocks.
pub struct AuthSession {
    store: Arc<dyn KeyValueStore>,
    state: RwLock<Session>,
    bootstrapped: AtomicBool,
    ready_tx: watch::Sender<bool>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            store,
            state: RwLock::new(Session::bootstrapping()),
            bootstrapped: AtomicBool::new(false),
            ready_tx,
        }
    }

    /// Restore a previously persisted session.
    ///
    /// Never fails: a missing, partial or unreadable record leaves the session
    /// logged out. Runs once; later calls only report the current state.
    pub fn bootstrap(&self) -> bool {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            warn!("Session bootstrap requested more than once, ignoring");
            return self.is_logged_in();
        }

        let restored = match self.read_persisted() {
            Ok(restored) => restored,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        let logged_in = {
            let mut state = self.write_state();
            // A login that raced the bootstrap wins over the stored record
            if !state.is_logged_in {
                *state = match restored {
                    Some((token, user)) => {
                        info!(user_id = %user.id, role = %user.role, "Restored persisted session");
                        Session::logged_in(token, user)
                    }
                    None => Session::logged_out(),
                };
            }
            state.is_loading = false;
            state.is_logged_in
        };

        self.ready_tx.send_replace(true);
        logged_in
    }

    /// Read the token/user pair. Any asymmetry is treated as no session and
    /// both keys are cleared so the next start sees a clean store.
    fn read_persisted(&self) -> Result<Option<(String, User)>> {
        let token = self.store.get(TOKEN_KEY).context("Failed to read persisted token")?;
        let user = self.store.get(USER_KEY).context("Failed to read persisted user")?;

        match (token, user) {
            (None, None) => {
                debug!("No persisted session");
                Ok(None)
            }
            (Some(token), Some(raw_user)) if !token.is_empty() => {
                match serde_json::from_str::<User>(&raw_user) {
                    Ok(user) => Ok(Some((token, user))),
                    Err(e) => {
                        warn!(error = %e, "Persisted user record is malformed, discarding session");
                        self.clear_persisted()?;
                        Ok(None)
                    }
                }
            }
            (token, user) => {
                warn!(
                    has_token = token.is_some(),
                    has_user = user.is_some(),
                    "Persisted session is incomplete, discarding it"
                );
                self.clear_persisted()?;
                Ok(None)
            }
        }
    }

    /// Start a session for `user` and persist it.
    ///
    /// The in-memory state is updated first. If the write fails the error is
    /// returned but the session stays logged in for this process.
    pub fn login(&self, token: String, user: User) -> Result<()> {
        if token.is_empty() {
            anyhow::bail!("Refusing to start a session with an empty token");
        }

        let serialized = serde_json::to_string(&user).context("Failed to serialize user")?;
        info!(user_id = %user.id, role = %user.role, "Logged in");
        *self.write_state() = Session::logged_in(token.clone(), user);

        self.store
            .set(TOKEN_KEY, &token)
            .context("Failed to persist token")?;
        self.store
            .set(USER_KEY, &serialized)
            .context("Failed to persist user")?;
        Ok(())
    }

    /// End the session. Both persisted entries are always attempted; the first
    /// failure, if any, is returned afterwards.
    pub fn logout(&self) -> Result<()> {
        {
            let mut state = self.write_state();
            let is_loading = state.is_loading;
            *state = Session::logged_out();
            state.is_loading = is_loading;
        }
        info!("Logged out");
        self.clear_persisted()
    }

    fn clear_persisted(&self) -> Result<()> {
        let token_result = self
            .store
            .remove(TOKEN_KEY)
            .context("Failed to remove persisted token");
        let user_result = self
            .store
            .remove(USER_KEY)
            .context("Failed to remove persisted user");

        if let Err(ref e) = token_result {
            warn!(error = %e, "Token removal failed");
        }
        if let Err(ref e) = user_result {
            warn!(error = %e, "User removal failed");
        }
        token_result.and(user_result)
    }

    // ===== Accessors =====

    pub fn snapshot(&self) -> Session {
        self.read_state().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.read_state().phase()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read_state().is_logged_in
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    /// Get the bearer token if logged in
    pub fn token(&self) -> Option<String> {
        let state = self.read_state();
        state.is_logged_in.then(|| state.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    pub fn is_doctor(&self) -> bool {
        self.read_state().user.as_ref().is_some_and(User::is_doctor)
    }

    pub fn is_patient(&self) -> bool {
        self.read_state().user.as_ref().is_some_and(User::is_patient)
    }

    /// True once `bootstrap` has finished
    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Wait until `bootstrap` has finished.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|ready| *ready).await;
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;
    use crate::models::UserRole;

    fn patient() -> User {
        User {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role: UserRole::Patient,
        }
    }

    fn doctor() -> User {
        User {
            id: "9".to_string(),
            email: "doc@b.com".to_string(),
            name: "Dr. B".to_string(),
            role: UserRole::Doctor,
        }
    }

    fn store_with(token: Option<&str>, user: Option<&str>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        if let Some(token) = token {
            store.set(TOKEN_KEY, token).unwrap();
        }
        if let Some(user) = user {
            store.set(USER_KEY, user).unwrap();
        }
        store
    }

    /// Store whose writes and removals always fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
        fn remove(&self, _key: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[test]
    fn test_starts_bootstrapping() {
        let session = AuthSession::new(Arc::new(MemoryStore::new()));
        assert_eq!(session.phase(), SessionPhase::Bootstrapping);
        assert!(session.is_loading());
        assert!(!session.is_ready());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_bootstrap_restores_valid_session() {
        let user_json = serde_json::to_string(&patient()).unwrap();
        let session = AuthSession::new(store_with(Some("tkn1"), Some(&user_json)));

        assert!(session.bootstrap());

        let snapshot = session.snapshot();
        assert!(snapshot.is_logged_in);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.token, "tkn1");
        assert_eq!(snapshot.user, Some(patient()));
        assert_eq!(session.phase(), SessionPhase::LoggedIn);
        assert!(session.is_ready());
    }

    #[test]
    fn test_bootstrap_empty_store() {
        let session = AuthSession::new(Arc::new(MemoryStore::new()));
        assert!(!session.bootstrap());
        assert_eq!(session.snapshot(), Session::logged_out());
        assert!(session.is_ready());
    }

    #[test]
    fn test_bootstrap_discards_torn_state() {
        let user_json = serde_json::to_string(&patient()).unwrap();
        let cases = [
            (Some("tkn1"), None),
            (None, Some(user_json.as_str())),
            (Some("tkn1"), Some("{not json")),
            (Some(""), Some(user_json.as_str())),
        ];

        for (token, user) in cases {
            let store = store_with(token, user);
            let session = AuthSession::new(store.clone());

            assert!(!session.bootstrap(), "case {:?}/{:?}", token, user);
            assert_eq!(session.snapshot(), Session::logged_out());
            assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
            assert_eq!(store.get(USER_KEY).unwrap(), None);
        }
    }

    #[test]
    fn test_bootstrap_never_raises_on_store_failure() {
        let session = AuthSession::new(Arc::new(BrokenStore));
        assert!(!session.bootstrap());
        assert!(!session.is_loading());
        assert!(session.is_ready());
    }

    #[test]
    fn test_bootstrap_runs_once() {
        let store = Arc::new(MemoryStore::new());
        let session = AuthSession::new(store.clone());
        assert!(!session.bootstrap());

        // A record appearing later is not picked up by a second bootstrap
        store.set(TOKEN_KEY, "late").unwrap();
        store
            .set(USER_KEY, &serde_json::to_string(&patient()).unwrap())
            .unwrap();
        assert!(!session.bootstrap());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_login_persists_both_entries() {
        let store = Arc::new(MemoryStore::new());
        let session = AuthSession::new(store.clone());
        session.bootstrap();

        session.login("tok".to_string(), patient()).unwrap();

        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        let raw = store.get(USER_KEY).unwrap().unwrap();
        let restored: User = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, patient());
        assert_eq!(session.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_login_rejects_empty_token() {
        let session = AuthSession::new(Arc::new(MemoryStore::new()));
        session.bootstrap();
        assert!(session.login(String::new(), patient()).is_err());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_login_keeps_memory_state_when_persisting_fails() {
        let session = AuthSession::new(Arc::new(BrokenStore));
        session.bootstrap();

        assert!(session.login("tok".to_string(), doctor()).is_err());
        assert!(session.is_logged_in());
        assert!(session.is_doctor());
    }

    #[test]
    fn test_login_before_bootstrap_completes_wins() {
        let session = AuthSession::new(Arc::new(MemoryStore::new()));
        session.login("fresh".to_string(), doctor()).unwrap();
        assert!(session.bootstrap());
        assert_eq!(session.token().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_logout_clears_everything() {
        let store = Arc::new(MemoryStore::new());
        let session = AuthSession::new(store.clone());
        session.bootstrap();
        session.login("tok".to_string(), patient()).unwrap();

        session.logout().unwrap();

        assert_eq!(session.snapshot(), Session::logged_out());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_logout_without_login() {
        let store = store_with(Some("stray"), None);
        let session = AuthSession::new(store.clone());
        // Not bootstrapped: the stray token is still in the store
        session.logout().unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_logout_reports_failure_but_clears_memory() {
        let session = AuthSession::new(Arc::new(BrokenStore));
        session.bootstrap();
        let _ = session.login("tok".to_string(), patient());

        assert!(session.logout().is_err());
        assert!(!session.is_logged_in());
        assert_eq!(session.user(), None);
    }

    #[test]
    fn test_role_predicates() {
        let session = AuthSession::new(Arc::new(MemoryStore::new()));
        session.bootstrap();
        assert!(!session.is_doctor());
        assert!(!session.is_patient());

        session.login("tok".to_string(), doctor()).unwrap();
        assert!(session.is_doctor());
        assert!(!session.is_patient());

        session.login("tok".to_string(), patient()).unwrap();
        assert!(!session.is_doctor());
        assert!(session.is_patient());

        session.logout().unwrap();
        assert!(!session.is_doctor());
        assert!(!session.is_patient());
    }

    #[tokio::test]
    async fn test_wait_ready_resolves_after_bootstrap() {
        let session = Arc::new(AuthSession::new(Arc::new(MemoryStore::new())));

        let waiter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session.wait_ready().await;
                session.is_loading()
            })
        };

        session.bootstrap();
        assert!(!waiter.await.unwrap());

        // Already ready: returns immediately
        session.wait_ready().await;
    }
}
