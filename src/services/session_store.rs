pub mod database_session_store;
pub mod memory_session_store;

pub use database_session_store::*;
pub use memory_session_store::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

/// Maps opaque session tokens to the username that logged in with them.
#[async_trait]
pub trait SessionStore {
    /// Stores a new session. The token must not be in use.
    async fn insert(&self, token: &str, username: &str) -> Result<(), SessionStoreError>;

    /// Returns the username bound to the token, or `None` if the session does not exist.
    async fn get(&self, token: &str) -> Result<Option<String>, SessionStoreError>;

    /// Removes a single session.
    /// Returns `false` if no session with that token existed.
    async fn remove(&self, token: &str) -> Result<bool, SessionStoreError>;

    /// Removes every session of a user, returning how many were removed.
    async fn remove_all(&self, username: &str) -> Result<usize, SessionStoreError>;
}
