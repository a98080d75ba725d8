use super::{compute_image_mime, normalize_username, ValidationError};
use crate::db::{
    models::{CreatingPhoto, ImageBlob, Photo},
    DbPool,
};
use diesel::{
    dsl::exists, BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl,
    SelectableHelper,
};
use diesel_async::{
    pooled_connection::deadpool::Object, scoped_futures::ScopedFutureExt, AsyncConnection,
    AsyncPgConnection, RunQueryDsl,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("event with ID `{event_id}` does not exist")]
    EventNotFound { event_id: i32 },
    #[error("photo with ID `{photo_id}` does not exist in event with ID `{event_id}`")]
    PhotoNotFound { event_id: i32, photo_id: i32 },
    #[error("only the owner and accepted collaborators may change the photos of event with ID `{event_id}`")]
    NotMember { event_id: i32 },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] PhotoServiceError),
}

impl_from_db_errors!(PhotoError, PhotoServiceError);

/// Locks the event row and checks that `username` is its owner or an accepted collaborator.
async fn check_membership(
    db: &mut Object<AsyncPgConnection>,
    event_id: i32,
    username: &str,
) -> Result<(), PhotoError> {
    use crate::db::schema;

    let owner = schema::events::table
        .filter(schema::events::id.eq(event_id))
        .select(schema::events::owner)
        .for_share()
        .first::<String>(db)
        .await
        .optional()?;
    let owner = match owner {
        Some(owner) => owner,
        None => return Err(PhotoError::EventNotFound { event_id }),
    };

    if owner == username {
        return Ok(());
    }

    let is_collaborator = diesel::select(exists(
        schema::event_collaborators::table.filter(
            schema::event_collaborators::event_id
                .eq(event_id)
                .and(schema::event_collaborators::username.eq(username))
                .and(schema::event_collaborators::accepted.eq(true)),
        ),
    ))
    .get_result::<bool>(db)
    .await?;

    if is_collaborator {
        Ok(())
    } else {
        Err(PhotoError::NotMember { event_id })
    }
}

pub struct PhotoService {
    db_pool: DbPool,
}

impl PhotoService {
    pub fn new(db_pool: DbPool) -> Arc<Self> {
        Arc::new(Self { db_pool })
    }

    /// Lists the photos of an event without their bytes, oldest first.
    /// Returns `None` if the event does not exist.
    pub async fn get_photos(
        &self,
        event_id: i32,
    ) -> Result<Option<Vec<Photo>>, PhotoServiceError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        let event_exists = diesel::select(exists(
            schema::events::table.filter(schema::events::id.eq(event_id)),
        ))
        .get_result::<bool>(db)
        .await?;

        if !event_exists {
            return Ok(None);
        }

        let photos = schema::photos::table
            .filter(schema::photos::event_id.eq(event_id))
            .select(Photo::as_select())
            .order(schema::photos::id.asc())
            .load::<Photo>(db)
            .await?;

        Ok(Some(photos))
    }

    pub async fn get_photo_data(
        &self,
        event_id: i32,
        photo_id: i32,
    ) -> Result<Option<ImageBlob>, PhotoServiceError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        let image = schema::photos::table
            .filter(
                schema::photos::id
                    .eq(photo_id)
                    .and(schema::photos::event_id.eq(event_id)),
            )
            .select((schema::photos::mime, schema::photos::data))
            .first::<ImageBlob>(db)
            .await
            .optional()?;

        Ok(image)
    }

    /// Stores a photo on behalf of `acting_username`.
    pub async fn add_photo(
        &self,
        event_id: i32,
        acting_username: &str,
        data: &[u8],
    ) -> Result<Photo, PhotoError> {
        use crate::db::schema;

        let acting_username = normalize_username(acting_username);
        let mime = compute_image_mime(data)?;

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, PhotoError, _>(|db| {
            async move {
                check_membership(db, event_id, &acting_username).await?;

                let photo = diesel::insert_into(schema::photos::table)
                    .values(CreatingPhoto {
                        event_id,
                        mime,
                        data,
                    })
                    .returning(Photo::as_returning())
                    .get_result::<Photo>(db)
                    .await?;

                Ok(photo)
            }
            .scope_boxed()
        })
        .await
    }

    /// Removes a photo on behalf of `acting_username`.
    pub async fn remove_photo(
        &self,
        event_id: i32,
        photo_id: i32,
        acting_username: &str,
    ) -> Result<Photo, PhotoError> {
        use crate::db::schema;

        let acting_username = normalize_username(acting_username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, PhotoError, _>(|db| {
            async move {
                check_membership(db, event_id, &acting_username).await?;

                let photo = diesel::delete(
                    schema::photos::table.filter(
                        schema::photos::id
                            .eq(photo_id)
                            .and(schema::photos::event_id.eq(event_id)),
                    ),
                )
                .returning(Photo::as_returning())
                .get_result::<Photo>(db)
                .await
                .optional()?;

                match photo {
                    Some(photo) => Ok(photo),
                    None => Err(PhotoError::PhotoNotFound { event_id, photo_id }),
                }
            }
            .scope_boxed()
        })
        .await
    }
}
