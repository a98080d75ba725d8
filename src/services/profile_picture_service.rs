use super::{compute_image_mime, normalize_username, ValidationError};
use crate::db::{
    models::{CreatingProfilePicture, ImageBlob},
    DbPool,
};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilePictureServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

#[derive(Error, Debug)]
pub enum ProfilePictureError {
    #[error("user `{username}` does not exist")]
    UserNotFound { username: String },
    #[error("user `{username}` has no profile picture")]
    NoProfilePicture { username: String },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] ProfilePictureServiceError),
}

impl_from_db_errors!(ProfilePictureError, ProfilePictureServiceError);

/// Profile pictures live in their own table and are referenced from `users.pfp`.
/// A picture row is only ever referenced by one user and is removed with the reference.
pub struct ProfilePictureService {
    db_pool: DbPool,
}

impl ProfilePictureService {
    pub fn new(db_pool: DbPool) -> Arc<Self> {
        Arc::new(Self { db_pool })
    }

    /// Retrieves the profile picture of a user.
    /// Returns `None` if the user does not exist or has no picture.
    pub async fn get_profile_picture(
        &self,
        username: &str,
    ) -> Result<Option<ImageBlob>, ProfilePictureServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        let image = schema::users::table
            .inner_join(schema::pfps::table)
            .filter(schema::users::username.eq(&username))
            .select((schema::pfps::mime, schema::pfps::data))
            .first::<ImageBlob>(db)
            .await
            .optional()?;

        Ok(image)
    }

    /// Stores a new picture and points the user at it.
    /// The previous picture, if any, is removed. Returns the ID of the new picture.
    pub async fn set_profile_picture(
        &self,
        username: &str,
        data: &[u8],
    ) -> Result<i32, ProfilePictureError> {
        use crate::db::schema;

        let username = normalize_username(username);
        let mime = compute_image_mime(data)?;

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, ProfilePictureError, _>(|db| {
            async move {
                let previous = schema::users::table
                    .filter(schema::users::username.eq(&username))
                    .select(schema::users::pfp)
                    .for_update()
                    .first::<Option<i32>>(db)
                    .await
                    .optional()?;
                let previous = match previous {
                    Some(previous) => previous,
                    None => return Err(ProfilePictureError::UserNotFound { username }),
                };

                let pfp_id = diesel::insert_into(schema::pfps::table)
                    .values(CreatingProfilePicture { mime, data })
                    .returning(schema::pfps::id)
                    .get_result::<i32>(db)
                    .await?;

                diesel::update(schema::users::table.filter(schema::users::username.eq(&username)))
                    .set(schema::users::pfp.eq(pfp_id))
                    .execute(db)
                    .await?;

                if let Some(previous) = previous {
                    diesel::delete(schema::pfps::table.filter(schema::pfps::id.eq(previous)))
                        .execute(db)
                        .await?;
                }

                Ok(pfp_id)
            }
            .scope_boxed()
        })
        .await
    }

    /// Replaces the bytes of the user's existing picture, keeping its ID.
    pub async fn update_profile_picture(
        &self,
        username: &str,
        data: &[u8],
    ) -> Result<i32, ProfilePictureError> {
        use crate::db::schema;

        let username = normalize_username(username);
        let mime = compute_image_mime(data)?;

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, ProfilePictureError, _>(|db| {
            async move {
                let pfp_id = schema::users::table
                    .filter(schema::users::username.eq(&username))
                    .select(schema::users::pfp)
                    .for_update()
                    .first::<Option<i32>>(db)
                    .await
                    .optional()?;
                let pfp_id = match pfp_id {
                    Some(Some(pfp_id)) => pfp_id,
                    Some(None) => return Err(ProfilePictureError::NoProfilePicture { username }),
                    None => return Err(ProfilePictureError::UserNotFound { username }),
                };

                diesel::update(schema::pfps::table.filter(schema::pfps::id.eq(pfp_id)))
                    .set((schema::pfps::mime.eq(mime), schema::pfps::data.eq(data)))
                    .execute(db)
                    .await?;

                Ok(pfp_id)
            }
            .scope_boxed()
        })
        .await
    }

    /// Detaches and removes the user's picture.
    pub async fn remove_profile_picture(&self, username: &str) -> Result<(), ProfilePictureError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, ProfilePictureError, _>(|db| {
            async move {
                let pfp_id = schema::users::table
                    .filter(schema::users::username.eq(&username))
                    .select(schema::users::pfp)
                    .for_update()
                    .first::<Option<i32>>(db)
                    .await
                    .optional()?;
                let pfp_id = match pfp_id {
                    Some(Some(pfp_id)) => pfp_id,
                    Some(None) => return Err(ProfilePictureError::NoProfilePicture { username }),
                    None => return Err(ProfilePictureError::UserNotFound { username }),
                };

                diesel::update(schema::users::table.filter(schema::users::username.eq(&username)))
                    .set(schema::users::pfp.eq(None::<i32>))
                    .execute(db)
                    .await?;

                diesel::delete(schema::pfps::table.filter(schema::pfps::id.eq(pfp_id)))
                    .execute(db)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}
