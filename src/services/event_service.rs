use super::{normalize_username, validate_event_fields, EventFields, ValidationError};
use crate::{
    db::{
        models::{CreatingEvent, Event, UpdatingEvent},
        DbPool,
    },
    dto::Patch,
};
use diesel::{BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

#[derive(Error, Debug)]
pub enum CreateEventError {
    #[error("user `{username}` does not exist")]
    OwnerNotFound { username: String },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] EventServiceError),
}

impl_from_db_errors!(CreateEventError, EventServiceError);

/// Outcome of an update or removal, both of which are reserved to the owner.
#[derive(Error, Debug)]
pub enum ModifyEventError {
    #[error("event with ID `{event_id}` does not exist")]
    NotFound { event_id: i32 },
    #[error("only the owner may modify event with ID `{event_id}`")]
    NotOwner { event_id: i32 },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] EventServiceError),
}

impl_from_db_errors!(ModifyEventError, EventServiceError);

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent<'a> {
    pub name: &'a str,
    pub start_time: i64,
    pub end_time: i64,
    pub location_lat: f64,
    pub location_lon: f64,
}

/// A partial update of an event. Every event field is required, so `Null` is rejected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventPatch<'a> {
    pub name: Patch<&'a str>,
    pub start_time: Patch<i64>,
    pub end_time: Patch<i64>,
    pub location_lat: Patch<f64>,
    pub location_lon: Patch<f64>,
}

fn merge_required<T>(patch: Patch<T>, current: T, field: &'static str) -> Result<T, ValidationError> {
    patch
        .merge_required(current)
        .ok_or(ValidationError::NullField { field })
}

pub struct EventService {
    db_pool: DbPool,
}

impl EventService {
    pub fn new(db_pool: DbPool) -> Arc<Self> {
        Arc::new(Self { db_pool })
    }

    /// Creates a new event owned by `owner`. Nothing is written if validation fails.
    pub async fn create_event(
        &self,
        owner: &str,
        new_event: NewEvent<'_>,
    ) -> Result<Event, CreateEventError> {
        use crate::db::schema;

        let owner = normalize_username(owner);
        validate_event_fields(&EventFields {
            name: new_event.name,
            start_time: new_event.start_time,
            end_time: new_event.end_time,
            location_lat: new_event.location_lat,
            location_lon: new_event.location_lon,
        })?;

        let db = &mut self.db_pool.get().await?;
        let event = diesel::insert_into(schema::events::table)
            .values(CreatingEvent {
                name: new_event.name,
                owner: &owner,
                start_time: new_event.start_time,
                end_time: new_event.end_time,
                location_lat: new_event.location_lat,
                location_lon: new_event.location_lon,
            })
            .returning(Event::as_returning())
            .get_result::<Event>(db)
            .await;

        match event {
            Ok(event) => Ok(event),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                err,
            )) if err.constraint_name() == Some("owner_fk") => {
                Err(CreateEventError::OwnerNotFound { username: owner })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Retrieves an event by its ID.
    pub async fn get_event_by_id(&self, event_id: i32) -> Result<Option<Event>, EventServiceError> {
        use crate::db::schema;

        let db = &mut self.db_pool.get().await?;
        let event = schema::events::table
            .filter(schema::events::id.eq(event_id))
            .select(Event::as_select())
            .first::<Event>(db)
            .await
            .optional()?;

        Ok(event)
    }

    /// Retrieves the events owned by a user, earliest first.
    pub async fn get_events_by_owner(&self, owner: &str) -> Result<Vec<Event>, EventServiceError> {
        use crate::db::schema;

        let owner = normalize_username(owner);

        let db = &mut self.db_pool.get().await?;
        let events = schema::events::table
            .filter(schema::events::owner.eq(&owner))
            .select(Event::as_select())
            .order((schema::events::start_time.asc(), schema::events::id.asc()))
            .load::<Event>(db)
            .await?;

        Ok(events)
    }

    /// Retrieves the events a user collaborates on. Only accepted invitations count.
    pub async fn get_events_by_collaborator(
        &self,
        username: &str,
    ) -> Result<Vec<Event>, EventServiceError> {
        self.get_events_by_invitation_state(username, true).await
    }

    /// Retrieves the events a user has been invited to but has not accepted yet.
    pub async fn get_invitations(&self, username: &str) -> Result<Vec<Event>, EventServiceError> {
        self.get_events_by_invitation_state(username, false).await
    }

    async fn get_events_by_invitation_state(
        &self,
        username: &str,
        accepted: bool,
    ) -> Result<Vec<Event>, EventServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        let events = schema::events::table
            .inner_join(schema::event_collaborators::table)
            .filter(
                schema::event_collaborators::username
                    .eq(&username)
                    .and(schema::event_collaborators::accepted.eq(accepted)),
            )
            .select(Event::as_select())
            .order((schema::events::start_time.asc(), schema::events::id.asc()))
            .load::<Event>(db)
            .await?;

        Ok(events)
    }

    /// Applies a partial update on behalf of `acting_username`, who must own the event.
    /// The merged event is validated as a whole before it is written.
    pub async fn update_event(
        &self,
        event_id: i32,
        acting_username: &str,
        patch: EventPatch<'_>,
    ) -> Result<Event, ModifyEventError> {
        use crate::db::schema;

        let acting_username = normalize_username(acting_username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, ModifyEventError, _>(|db| {
            async move {
                let current = schema::events::table
                    .filter(schema::events::id.eq(event_id))
                    .select(Event::as_select())
                    .for_update()
                    .first::<Event>(db)
                    .await
                    .optional()?;
                let current = match current {
                    Some(current) => current,
                    None => return Err(ModifyEventError::NotFound { event_id }),
                };

                if current.owner != acting_username {
                    return Err(ModifyEventError::NotOwner { event_id });
                }

                let fields = EventFields {
                    name: merge_required(patch.name, current.name.as_str(), "name")?,
                    start_time: merge_required(patch.start_time, current.start_time, "start")?,
                    end_time: merge_required(patch.end_time, current.end_time, "end")?,
                    location_lat: merge_required(
                        patch.location_lat,
                        current.location_lat,
                        "location_lat",
                    )?,
                    location_lon: merge_required(
                        patch.location_lon,
                        current.location_lon,
                        "location_lon",
                    )?,
                };
                validate_event_fields(&fields)?;

                let event =
                    diesel::update(schema::events::table.filter(schema::events::id.eq(event_id)))
                        .set(UpdatingEvent {
                            name: fields.name,
                            start_time: fields.start_time,
                            end_time: fields.end_time,
                            location_lat: fields.location_lat,
                            location_lon: fields.location_lon,
                        })
                        .returning(Event::as_returning())
                        .get_result::<Event>(db)
                        .await?;

                Ok(event)
            }
            .scope_boxed()
        })
        .await
    }

    /// Removes an event on behalf of `acting_username`, who must own it.
    /// Collaborators and photos are removed by cascade.
    pub async fn remove_event(
        &self,
        event_id: i32,
        acting_username: &str,
    ) -> Result<Event, ModifyEventError> {
        use crate::db::schema;

        let acting_username = normalize_username(acting_username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, ModifyEventError, _>(|db| {
            async move {
                let owner = schema::events::table
                    .filter(schema::events::id.eq(event_id))
                    .select(schema::events::owner)
                    .for_update()
                    .first::<String>(db)
                    .await
                    .optional()?;

                match owner {
                    None => return Err(ModifyEventError::NotFound { event_id }),
                    Some(owner) if owner != acting_username => {
                        return Err(ModifyEventError::NotOwner { event_id });
                    }
                    Some(_) => {}
                }

                let event =
                    diesel::delete(schema::events::table.filter(schema::events::id.eq(event_id)))
                        .returning(Event::as_returning())
                        .get_result::<Event>(db)
                        .await?;

                Ok(event)
            }
            .scope_boxed()
        })
        .await
    }
}
