//! Authentication module for managing the user session and its persistence.
//!
//! This module provides:
//! - `AuthSession`: in-memory session state, bootstrapped once from the store
//! - `KeyValueStore`: the durable store holding the `token` and `user` entries,
//!   with file, OS keychain and in-memory implementations
//!
//! The store is shared with the API client, which reads the token on every
//! request and evicts it on a 401.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringStore;
pub use session::{AuthSession, Session, SessionPhase};
pub use store::{FileStore, KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};
