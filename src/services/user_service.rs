use super::{
    normalize_username, password_service, validate_password, validate_user_fields,
    validate_username, PasswordService, UserFields, ValidationError,
};
use crate::{
    db::{
        models::{CreatingUser, UpdatingUser, User, UserRow},
        DbPool,
    },
    dto::Patch,
};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserServiceError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
    #[error("{0}")]
    PasswordService(#[from] password_service::PasswordServiceError),
}

#[derive(Error, Debug)]
pub enum CreateUserError {
    #[error("username `{username}` is already taken")]
    AlreadyExists { username: String },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] UserServiceError),
}

impl_from_db_errors!(CreateUserError, UserServiceError);

#[derive(Error, Debug)]
pub enum UpdateUserError {
    #[error("user `{username}` does not exist")]
    NotFound { username: String },
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Error(#[from] UserServiceError),
}

impl_from_db_errors!(UpdateUserError, UserServiceError);

/// Fields of a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub pronouns: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub age: Option<i32>,
    pub year: Option<i32>,
}

/// A partial update of an account.
/// Missing fields keep their value, `Null` clears optional fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPatch<'a> {
    pub password: Patch<&'a str>,
    pub name: Patch<&'a str>,
    pub pronouns: Patch<&'a str>,
    pub bio: Patch<&'a str>,
    pub age: Patch<i32>,
    pub year: Patch<i32>,
}

pub struct UserService {
    db_pool: DbPool,
    password_service: Arc<PasswordService>,
}

impl UserService {
    pub fn new(db_pool: DbPool, password_service: Arc<PasswordService>) -> Arc<Self> {
        Arc::new(Self {
            db_pool,
            password_service,
        })
    }

    /// Creates a new user. The username is lower-cased and the password is hashed before being stored.
    pub async fn create_user(&self, new_user: NewUser<'_>) -> Result<User, CreateUserError> {
        use crate::db::schema;

        let username = normalize_username(new_user.username);
        validate_username(&username)?;
        validate_password(new_user.password)?;
        validate_user_fields(&UserFields {
            name: new_user.name,
            pronouns: new_user.pronouns,
            bio: new_user.bio,
            age: new_user.age,
            year: new_user.year,
        })?;

        let password_hash = self
            .password_service
            .hash_password(new_user.password)
            .map_err(UserServiceError::from)?;

        let db = &mut self.db_pool.get().await?;
        let user = diesel::insert_into(schema::users::table)
            .values(CreatingUser {
                username: &username,
                password: &password_hash,
                name: new_user.name,
                pronouns: new_user.pronouns,
                bio: new_user.bio,
                age: new_user.age,
                year: new_user.year,
            })
            .returning(User::as_returning())
            .get_result::<User>(db)
            .await;

        match user {
            Ok(user) => Ok(user),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(CreateUserError::AlreadyExists { username }),
            Err(err) => Err(err.into()),
        }
    }

    /// Retrieves a user by their username, ignoring case.
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        let user = schema::users::table
            .filter(schema::users::username.eq(&username))
            .select(User::as_select())
            .first::<User>(db)
            .await
            .optional()?;

        Ok(user)
    }

    /// Merges the patch into the stored row and writes the whole row back.
    /// Validation runs against the merged row, so a partial update can never leave an invalid user behind.
    pub async fn update_user(
        &self,
        username: &str,
        patch: UserPatch<'_>,
    ) -> Result<User, UpdateUserError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let password_hash = match patch.password {
            Patch::Missing => None,
            Patch::Null => {
                return Err(ValidationError::NullField { field: "password" }.into());
            }
            Patch::Value(password) => {
                validate_password(password)?;
                let password_hash = self
                    .password_service
                    .hash_password(password)
                    .map_err(UserServiceError::from)?;
                Some(password_hash)
            }
        };

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, UpdateUserError, _>(|db| {
            async move {
                let current = schema::users::table
                    .filter(schema::users::username.eq(&username))
                    .select(UserRow::as_select())
                    .for_update()
                    .first::<UserRow>(db)
                    .await
                    .optional()?;
                let current = match current {
                    Some(current) => current,
                    None => return Err(UpdateUserError::NotFound { username }),
                };

                let name = patch
                    .name
                    .merge_required(current.name.as_str())
                    .ok_or(ValidationError::NullField { field: "name" })?;
                let fields = UserFields {
                    name,
                    pronouns: patch.pronouns.merge(current.pronouns.as_deref()),
                    bio: patch.bio.merge(current.bio.as_deref()),
                    age: patch.age.merge(current.age),
                    year: patch.year.merge(current.year),
                };
                validate_user_fields(&fields)?;

                let user = diesel::update(
                    schema::users::table.filter(schema::users::username.eq(&current.username)),
                )
                .set(UpdatingUser {
                    password: password_hash.as_deref().unwrap_or(&current.password),
                    name: fields.name,
                    pronouns: fields.pronouns,
                    bio: fields.bio,
                    age: fields.age,
                    year: fields.year,
                })
                .returning(User::as_returning())
                .get_result::<User>(db)
                .await?;

                Ok(user)
            }
            .scope_boxed()
        })
        .await
    }

    /// Removes a user together with their profile picture.
    /// Owned events, collaborations, friendships and sessions are removed by cascade.
    /// Returns the user that was removed, or `None` if the user was not found.
    pub async fn remove_user(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        use crate::db::schema;

        let username = normalize_username(username);

        let db = &mut self.db_pool.get().await?;
        db.transaction::<_, UserServiceError, _>(|db| {
            async move {
                let user = diesel::delete(
                    schema::users::table.filter(schema::users::username.eq(&username)),
                )
                .returning(User::as_returning())
                .get_result::<User>(db)
                .await
                .optional()?;

                if let Some(pfp_id) = user.as_ref().and_then(|user| user.pfp) {
                    diesel::delete(schema::pfps::table.filter(schema::pfps::id.eq(pfp_id)))
                        .execute(db)
                        .await?;
                }

                Ok(user)
            }
            .scope_boxed()
        })
        .await
    }
}
