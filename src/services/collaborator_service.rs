use super::normalize_username;
use crate::db::{
    models::{CreatingEventCollaborator, EventCollaborator},
    DbPool,
};
use diesel::{
    dsl::exists, BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl,
    SelectableHelper,
};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollaboratorServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

#[derive(Error, Debug)]
pub enum InviteCollaboratorError {
    #[error("event with ID `{event_id}` does not exist")]
    EventNotFound { event_id: i32 },
    #[error("only the owner may invite collaborators to event with ID `{event_id}`")]
    NotOwner { event_id: i32 },
    #[error("the owner of an event cannot be invited to it")]
    InviteOwner,
    #[error("user `{username}` does not exist")]
    UserNotFound { username: String },
    #[error("user `{username}` is already invited to event with ID `{event_id}`")]
    AlreadyInvited { event_id: i32, username: String },
    #[error("{0}")]
    Error(#[from] CollaboratorServiceError),
}

impl_from_db_errors!(InviteCollaboratorError, CollaboratorServiceError);

#[derive(Error, Debug)]
pub enum RemoveCollaboratorError {
    #[error("event with ID `{event_id}` does not exist")]
    EventNotFound { event_id: i32 },
    #[error("only the owner or the collaborator themselves may remove a collaborator")]
    NotAllowed,
    #[error("user `{username}` is not invited to event with ID `{event_id}`")]
    NotInvited { event_id: i32, username: String },
    #[error("{0}")]
    Error(#[from] CollaboratorServiceError),
}

impl_from_db_errors!(RemoveCollaboratorError, CollaboratorServiceError);

#[derive(Error, Debug)]
pub enum RespondInvitationError {
    #[error("user `{username}` is not invited to event with ID `{event_id}`")]
    NotInvited { event_id: i32, username: String },
    #[error("{0}")]
    Error(#[from] CollaboratorServiceError),
}

impl_from_db_errors!(RespondInvitationError, CollaboratorServiceError);

/// Invitations and collaborations share one table.
/// A row with `accepted = false` is a pending invitation.
pub struct CollaboratorService {
    db_pool: DbPool,
}

impl CollaboratorService {
    pub fn new(db_pool: DbPool) -> Arc<Self> {
        Arc::new(Self { db_pool })
    }

    /// Retrieves everyone invited to an event, accepted or not, ordered by username.
    /// Returns `None` if the event does not exist.
    pub async fn get_collaborators(
        &self,
        event_id: i32,
    ) -> Result<Option<Vec<EventCollaborator>>, CollaboratorServiceError> {
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

        let collaborators = schema::event_collaborators::table
            .filter(schema::event_collaborators::event_id.eq(event_id))
            .select(EventCollaborator::as_select())
            .order(schema::event_collaborators::username.asc())
            .load::<EventCollaborator>(db)
            .await?;

        Ok(Some(collaborators))
    }

    /// Invites `username` to an event owned by `acting_username`.
    pub async fn invite_collaborator(
        &self,
        event_id: i32,
        acting_username: &str,
        username: &str,
    ) -> Result<EventCollaborator, InviteCollaboratorError> {
        use crate::db::schema;

        let acting_username = normalize_username(acting_username);
        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, InviteCollaboratorError, _>(|db| {
            async move {
                let owner = schema::events::table
                    .filter(schema::events::id.eq(event_id))
                    .select(schema::events::owner)
                    .for_share()
                    .first::<String>(db)
                    .await
                    .optional()?;
                let owner = match owner {
                    Some(owner) => owner,
                    None => return Err(InviteCollaboratorError::EventNotFound { event_id }),
                };

                if owner != acting_username {
                    return Err(InviteCollaboratorError::NotOwner { event_id });
                }

                if owner == username {
                    return Err(InviteCollaboratorError::InviteOwner);
                }

                let collaborator = diesel::insert_into(schema::event_collaborators::table)
                    .values(CreatingEventCollaborator {
                        event_id,
                        username: &username,
                    })
                    .returning(EventCollaborator::as_returning())
                    .get_result::<EventCollaborator>(db)
                    .await;

                match collaborator {
                    Ok(collaborator) => Ok(collaborator),
                    Err(diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _,
                    )) => Err(InviteCollaboratorError::AlreadyInvited { event_id, username }),
                    Err(diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                        err,
                    )) if err.constraint_name() == Some("user_fk") => {
                        Err(InviteCollaboratorError::UserNotFound { username })
                    }
                    Err(err) => Err(err.into()),
                }
            }
            .scope_boxed()
        })
        .await
    }

    /// Removes `username` from an event. Allowed for the owner, and for the collaborator
    /// leaving on their own.
    pub async fn remove_collaborator(
        &self,
        event_id: i32,
        acting_username: &str,
        username: &str,
    ) -> Result<EventCollaborator, RemoveCollaboratorError> {
        use crate::db::schema;

        let acting_username = normalize_username(acting_username);
        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, RemoveCollaboratorError, _>(|db| {
            async move {
                let owner = schema::events::table
                    .filter(schema::events::id.eq(event_id))
                    .select(schema::events::owner)
                    .for_share()
                    .first::<String>(db)
                    .await
                    .optional()?;
                let owner = match owner {
                    Some(owner) => owner,
                    None => return Err(RemoveCollaboratorError::EventNotFound { event_id }),
                };

                if owner != acting_username && username != acting_username {
                    return Err(RemoveCollaboratorError::NotAllowed);
                }

                let collaborator = diesel::delete(
                    schema::event_collaborators::table.filter(
                        schema::event_collaborators::event_id
                            .eq(event_id)
                            .and(schema::event_collaborators::username.eq(&username)),
                    ),
                )
                .returning(EventCollaborator::as_returning())
                .get_result::<EventCollaborator>(db)
                .await
                .optional()?;

                match collaborator {
                    Some(collaborator) => Ok(collaborator),
                    None => Err(RemoveCollaboratorError::NotInvited { event_id, username }),
                }
            }
            .scope_boxed()
        })
        .await
    }

    /// Accepts a pending invitation. Accepting twice is a no-op.
    pub async fn accept_invitation(
        &self,
        event_id: i32,
        username: &str,
    ) -> Result<EventCollaborator, RespondInvitationError> {
        self.set_accepted(event_id, username, true).await
    }

    /// Declines an invitation. The row stays, so the owner still sees it as declined.
    pub async fn decline_invitation(
        &self,
        event_id: i32,
        username: &str,
    ) -> Result<EventCollaborator, RespondInvitationError> {
        self.set_accepted(event_id, username, false).await
    }

    async fn set_accepted(
        &self,
        event_id: i32,
        username: &str,
        accepted: bool,
    ) -> Result<EventCollaborator, RespondInvitationError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        let collaborator = diesel::update(
            schema::event_collaborators::table.filter(
                schema::event_collaborators::event_id
                    .eq(event_id)
                    .and(schema::event_collaborators::username.eq(&username)),
            ),
        )
        .set(schema::event_collaborators::accepted.eq(accepted))
        .returning(EventCollaborator::as_returning())
        .get_result::<EventCollaborator>(db)
        .await
        .optional()?;

        match collaborator {
            Some(collaborator) => Ok(collaborator),
            None => Err(RespondInvitationError::NotInvited { event_id, username }),
        }
    }
}
