use super::{SessionStore, SessionStoreError};
use crate::db::{models::CreatingUserSession, DbPool};
use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;

/// Keeps sessions in the `user_sessions` table.
/// Sessions survive restarts and disappear together with their user.
pub struct DatabaseSessionStore {
    db_pool: DbPool,
}

impl DatabaseSessionStore {
    pub fn new(db_pool: DbPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SessionStore for DatabaseSessionStore {
    async fn insert(&self, token: &str, username: &str) -> Result<(), SessionStoreError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        diesel::insert_into(schema::user_sessions::table)
            .values(CreatingUserSession { token, username })
            .execute(db)
            .await?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>, SessionStoreError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        let username = schema::user_sessions::table
            .filter(schema::user_sessions::token.eq(token))
            .select(schema::user_sessions::username)
            .first::<String>(db)
            .await
            .optional()?;

        Ok(username)
    }

    async fn remove(&self, token: &str) -> Result<bool, SessionStoreError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        let removed = diesel::delete(
            schema::user_sessions::table.filter(schema::user_sessions::token.eq(token)),
        )
        .execute(db)
        .await?;

        Ok(removed != 0)
    }

    async fn remove_all(&self, username: &str) -> Result<usize, SessionStoreError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        let removed = diesel::delete(
            schema::user_sessions::table.filter(schema::user_sessions::username.eq(username)),
        )
        .execute(db)
        .await?;

        Ok(removed)
    }
}
