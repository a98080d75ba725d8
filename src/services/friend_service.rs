use super::{normalize_username, ValidationError};
use crate::db::{
    models::{CreatingFriendship, User},
    DbPool,
};
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FriendServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

#[derive(Error, Debug)]
pub enum AddFriendError {
    #[error("user `{username}` does not exist")]
    UserNotFound { username: String },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] FriendServiceError),
}

impl_from_db_errors!(AddFriendError, FriendServiceError);

/// Friendship is symmetric. Each friendship is stored as two rows, one per direction.
pub struct FriendService {
    db_pool: DbPool,
}

impl FriendService {
    pub fn new(db_pool: DbPool) -> Arc<Self> {
        Arc::new(Self { db_pool })
    }

    /// Retrieves the friends of a user, ordered by username.
    pub async fn get_friends(&self, username: &str) -> Result<Vec<User>, FriendServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        let friend_usernames = schema::friendships::table
            .filter(schema::friendships::username.eq(&username))
            .select(schema::friendships::friend_username);

        let friends = schema::users::table
            .filter(schema::users::username.eq_any(friend_usernames))
            .select(User::as_select())
            .order(schema::users::username.asc())
            .load::<User>(db)
            .await?;

        Ok(friends)
    }

    /// Makes two users friends. Adding an existing friendship is a no-op.
    pub async fn add_friend(&self, username: &str, friend: &str) -> Result<(), AddFriendError> {
        use crate::db::schema;

        let username = normalize_username(username);
        let friend = normalize_username(friend);

        if username == friend {
            return Err(ValidationError::SelfFriendship.into());
        }

        // both rows go in with one statement
        let db = &mut self.db_pool.get().await?;
        let result = diesel::insert_into(schema::friendships::table)
            .values(&vec![
                CreatingFriendship {
                    username: &username,
                    friend_username: &friend,
                },
                CreatingFriendship {
                    username: &friend,
                    friend_username: &username,
                },
            ])
            .on_conflict_do_nothing()
            .execute(db)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                err,
            )) => {
                // either side may be the missing one
                let missing = match err.constraint_name() {
                    Some("user_fk") => username,
                    _ => friend,
                };
                Err(AddFriendError::UserNotFound { username: missing })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Ends a friendship in both directions.
    /// Returns `false` if the two users were not friends.
    pub async fn remove_friend(
        &self,
        username: &str,
        friend: &str,
    ) -> Result<bool, FriendServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);
        let friend = normalize_username(friend);

        let db = &mut self.db_pool.get().await?;
        let removed = diesel::delete(
            schema::friendships::table.filter(
                schema::friendships::username
                    .eq(&username)
                    .and(schema::friendships::friend_username.eq(&friend))
                    .or(schema::friendships::username
                        .eq(&friend)
                        .and(schema::friendships::friend_username.eq(&username))),
            ),
        )
        .execute(db)
        .await?;

        Ok(removed != 0)
    }
}
