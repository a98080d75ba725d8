use super::{normalize_username, password_service, PasswordService, SessionStore, SessionStoreError};
use crate::db::{models::UserWithPassword, DbPool};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
    #[error("{0}")]
    PasswordService(#[from] password_service::PasswordServiceError),
    #[error("session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
}

pub struct AuthService {
    db_pool: DbPool,
    password_service: Arc<PasswordService>,
    session_store: Arc<dyn SessionStore + Send + Sync>,
}

impl AuthService {
    pub fn new(
        db_pool: DbPool,
        password_service: Arc<PasswordService>,
        session_store: Arc<dyn SessionStore + Send + Sync>,
    ) -> Arc<Self> {
        Arc::new(Self {
            db_pool,
            password_service,
            session_store,
        })
    }

    /// Authenticates a user by their username and password.
    /// Returns the stored (lower-cased) username if the authentication is successful, otherwise `None`.
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, AuthServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        let user = schema::users::table
            .filter(schema::users::username.eq(&username))
            .select((schema::users::username, schema::users::password))
            .first::<UserWithPassword>(db)
            .await
            .optional()?;

        let user = match user {
            Some(user) => user,
            None => {
                // prevent timing attacks by hashing a fake password
                self.password_service.hash_password(password)?;
                return Ok(None);
            }
        };

        if !self
            .password_service
            .verify_password_hash(password, &user.password)?
        {
            return Ok(None);
        }

        Ok(Some(user.username))
    }

    /// Creates a new session for the given user and returns its token.
    pub async fn create_session(&self, username: &str) -> Result<String, AuthServiceError> {
        let token = self.password_service.generate_session_token();
        self.session_store.insert(&token, username).await?;
        Ok(token)
    }

    /// Resolves a session token to the username it belongs to.
    pub async fn get_username_from_session(
        &self,
        token: &str,
    ) -> Result<Option<String>, AuthServiceError> {
        Ok(self.session_store.get(token).await?)
    }

    /// Removes a session. Returns `false` if it did not exist.
    pub async fn remove_session(&self, token: &str) -> Result<bool, AuthServiceError> {
        Ok(self.session_store.remove(token).await?)
    }

    /// Logs a user out everywhere.
    pub async fn remove_user_sessions(&self, username: &str) -> Result<usize, AuthServiceError> {
        Ok(self.session_store.remove_all(username).await?)
    }
}
