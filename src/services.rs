/// Implements `From<diesel::result::Error>` and `From<PoolError>` for an operation error
/// whose `Error` variant wraps the given service error.
/// Needed for `?` inside database transactions.
macro_rules! impl_from_db_errors {
    ($error:ty, $service_error:ident) => {
        impl From<diesel::result::Error> for $error {
            fn from(err: diesel::result::Error) -> Self {
                Self::Error($service_error::from(err))
            }
        }

        impl From<diesel_async::pooled_connection::deadpool::PoolError> for $error {
            fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
                Self::Error($service_error::from(err))
            }
        }
    };
}

mod auth_service;
mod collaborator_service;
mod compute_image_mime;
mod event_service;
mod friend_service;
mod password_service;
mod photo_service;
mod profile_picture_service;
mod session_store;
mod user_service;
mod validation;

pub use auth_service::*;
pub use collaborator_service::*;
pub use compute_image_mime::*;
pub use event_service::*;
pub use friend_service::*;
pub use password_service::*;
pub use photo_service::*;
pub use profile_picture_service::*;
pub use session_store::*;
pub use user_service::*;
pub use validation::*;

use crate::{config::SessionStoreKind, db::DbPool};
use rocket::{Build, Rocket};
use std::sync::Arc;

pub fn create_session_store(
    kind: SessionStoreKind,
    db_pool: DbPool,
) -> Arc<dyn SessionStore + Send + Sync> {
    match kind {
        SessionStoreKind::Database => Arc::new(DatabaseSessionStore::new(db_pool)),
        SessionStoreKind::Memory => Arc::new(MemorySessionStore::new()),
    }
}

pub fn register_services(
    rocket: Rocket<Build>,
    db_pool: DbPool,
    session_store: Arc<dyn SessionStore + Send + Sync>,
) -> Rocket<Build> {
    let password_service = PasswordService::new();
    let auth_service = AuthService::new(db_pool.clone(), password_service.clone(), session_store);
    let user_service = UserService::new(db_pool.clone(), password_service.clone());
    let profile_picture_service = ProfilePictureService::new(db_pool.clone());
    let friend_service = FriendService::new(db_pool.clone());
    let event_service = EventService::new(db_pool.clone());
    let collaborator_service = CollaboratorService::new(db_pool.clone());
    let photo_service = PhotoService::new(db_pool);

    rocket
        .manage(password_service)
        .manage(auth_service)
        .manage(user_service)
        .manage(profile_picture_service)
        .manage(friend_service)
        .manage(event_service)
        .manage(collaborator_service)
        .manage(photo_service)
}
