use super::dto::{CreatingUser, UpdatingUser};
use crate::{
    config::AppConfig,
    db::models::{Event, User},
    dto::{Error, ImageData, JsonRes, Success},
    guards::{SessionContext, SESSION_COOKIE, USERNAME_COOKIE},
    routes::read_image_body,
    services::{
        AddFriendError, AuthService, CreateUserError, EventService, FriendService, NewUser,
        ProfilePictureError, ProfilePictureService, UpdateUserError, UserPatch, UserService,
    },
};
use rocket::{
    delete, get,
    http::{CookieJar, Status},
    post, put, routes,
    serde::json::Json,
    Build, Data, Rocket, State,
};
use std::sync::Arc;

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/api/user",
        routes![
            create_user,
            get_me,
            get_user,
            update_user,
            remove_user,
            get_my_profile_picture,
            set_my_profile_picture,
            update_my_profile_picture,
            remove_my_profile_picture,
            get_profile_picture,
            get_my_friends,
            get_friends,
            add_friend,
            remove_friend,
            get_my_events,
            get_my_collaborations,
            get_my_invitations,
        ],
    )
}

fn profile_picture_error(controller: &'static str, username: &str, err: ProfilePictureError) -> Error {
    match err {
        ProfilePictureError::UserNotFound { .. } | ProfilePictureError::NoProfilePicture { .. } => {
            Error::new_dynamic(Status::NotFound, err.to_string())
        }
        ProfilePictureError::Validation(err) => err.into(),
        ProfilePictureError::Error(err) => {
            log::error!(target: "routes::user::controllers", controller, service = "ProfilePictureService", username:serde, err:err; "Error returned from service.");
            Status::InternalServerError.into()
        }
    }
}

#[post("/", data = "<body>")]
async fn create_user(
    user_service: &State<Arc<UserService>>,
    body: Json<CreatingUser>,
) -> JsonRes<Success> {
    let user = user_service
        .create_user(NewUser {
            username: &body.username,
            password: &body.password,
            name: &body.name,
            pronouns: body.pronouns.as_deref(),
            bio: body.bio.as_deref(),
            age: body.age,
            year: body.year,
        })
        .await;

    match user {
        Ok(_) => {}
        Err(err) => match err {
            CreateUserError::AlreadyExists { .. } => {
                return Err(Error::new_dynamic(Status::Conflict, err.to_string()));
            }
            CreateUserError::Validation(err) => {
                return Err(err.into());
            }
            CreateUserError::Error(err) => {
                let username = &body.username;
                log::error!(target: "routes::user::controllers", controller = "create_user", service = "UserService", username:serde, err:err; "Error returned from service.");
                return Err(Status::InternalServerError.into());
            }
        },
    }

    Ok((Status::Created, Success::json()))
}

#[get("/me")]
async fn get_me(sess: SessionContext, user_service: &State<Arc<UserService>>) -> JsonRes<User> {
    let user = user_service.get_user_by_username(&sess.username).await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_me", service = "UserService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(user)))
}

#[get("/<username>")]
async fn get_user(user_service: &State<Arc<UserService>>, username: &str) -> JsonRes<User> {
    let user = user_service.get_user_by_username(username).await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_user", service = "UserService", username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(user)))
}

#[put("/", data = "<body>")]
async fn update_user(
    sess: SessionContext,
    user_service: &State<Arc<UserService>>,
    body: Json<UpdatingUser>,
) -> JsonRes<User> {
    let user = user_service
        .update_user(
            &sess.username,
            UserPatch {
                password: body.password.as_deref(),
                name: body.name.as_deref(),
                pronouns: body.pronouns.as_deref(),
                bio: body.bio.as_deref(),
                age: body.age.clone(),
                year: body.year.clone(),
            },
        )
        .await;

    let user = match user {
        Ok(user) => user,
        Err(err) => match err {
            UpdateUserError::NotFound { .. } => {
                return Err(Status::NotFound.into());
            }
            UpdateUserError::Validation(err) => {
                return Err(err.into());
            }
            UpdateUserError::Error(err) => {
                log::error!(target: "routes::user::controllers", controller = "update_user", service = "UserService", sess:serde, err:err; "Error returned from service.");
                return Err(Status::InternalServerError.into());
            }
        },
    };

    Ok((Status::Ok, Json(user)))
}

#[delete("/")]
async fn remove_user(
    sess: SessionContext,
    auth_service: &State<Arc<AuthService>>,
    user_service: &State<Arc<UserService>>,
    cookies: &CookieJar<'_>,
) -> JsonRes<Success> {
    let user = user_service.remove_user(&sess.username).await;

    match user {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "remove_user", service = "UserService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    }

    // the database store drops sessions by cascade, the memory store does not
    if let Err(err) = auth_service.remove_user_sessions(&sess.username).await {
        log::error!(target: "routes::user::controllers", controller = "remove_user", service = "AuthService", sess:serde, err:err; "Error returned from service.");
        return Err(Status::InternalServerError.into());
    }

    cookies.remove(SESSION_COOKIE);
    cookies.remove(USERNAME_COOKIE);

    Ok((Status::Ok, Success::json()))
}

#[get("/me/pfp")]
async fn get_my_profile_picture(
    sess: SessionContext,
    profile_picture_service: &State<Arc<ProfilePictureService>>,
) -> Result<ImageData, Error> {
    let image = profile_picture_service
        .get_profile_picture(&sess.username)
        .await;

    let image = match image {
        Ok(Some(image)) => image,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_my_profile_picture", service = "ProfilePictureService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok(ImageData::new(&image.mime, image.data))
}

#[post("/me/pfp", data = "<body>")]
async fn set_my_profile_picture(
    sess: SessionContext,
    app_config: &State<AppConfig>,
    profile_picture_service: &State<Arc<ProfilePictureService>>,
    body: Data<'_>,
) -> JsonRes<Success> {
    let data = read_image_body(body, app_config.image_limit()).await?;
    let pfp_id = profile_picture_service
        .set_profile_picture(&sess.username, &data)
        .await;

    if let Err(err) = pfp_id {
        return Err(profile_picture_error(
            "set_my_profile_picture",
            &sess.username,
            err,
        ));
    }

    Ok((Status::Created, Success::json()))
}

#[put("/me/pfp", data = "<body>")]
async fn update_my_profile_picture(
    sess: SessionContext,
    app_config: &State<AppConfig>,
    profile_picture_service: &State<Arc<ProfilePictureService>>,
    body: Data<'_>,
) -> JsonRes<Success> {
    let data = read_image_body(body, app_config.image_limit()).await?;
    let pfp_id = profile_picture_service
        .update_profile_picture(&sess.username, &data)
        .await;

    if let Err(err) = pfp_id {
        return Err(profile_picture_error(
            "update_my_profile_picture",
            &sess.username,
            err,
        ));
    }

    Ok((Status::Ok, Success::json()))
}

#[delete("/me/pfp")]
async fn remove_my_profile_picture(
    sess: SessionContext,
    profile_picture_service: &State<Arc<ProfilePictureService>>,
) -> JsonRes<Success> {
    let removed = profile_picture_service
        .remove_profile_picture(&sess.username)
        .await;

    if let Err(err) = removed {
        return Err(profile_picture_error(
            "remove_my_profile_picture",
            &sess.username,
            err,
        ));
    }

    Ok((Status::Ok, Success::json()))
}

#[get("/<username>/pfp")]
async fn get_profile_picture(
    profile_picture_service: &State<Arc<ProfilePictureService>>,
    username: &str,
) -> Result<ImageData, Error> {
    let image = profile_picture_service.get_profile_picture(username).await;

    let image = match image {
        Ok(Some(image)) => image,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_profile_picture", service = "ProfilePictureService", username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok(ImageData::new(&image.mime, image.data))
}

#[get("/me/friends")]
async fn get_my_friends(
    sess: SessionContext,
    friend_service: &State<Arc<FriendService>>,
) -> JsonRes<Vec<User>> {
    let friends = friend_service.get_friends(&sess.username).await;

    let friends = match friends {
        Ok(friends) => friends,
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_my_friends", service = "FriendService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(friends)))
}

#[get("/<username>/friends")]
async fn get_friends(
    #[allow(unused_variables)] sess: SessionContext,
    user_service: &State<Arc<UserService>>,
    friend_service: &State<Arc<FriendService>>,
    username: &str,
) -> JsonRes<Vec<User>> {
    let user = user_service.get_user_by_username(username).await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_friends", service = "UserService", username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    let friends = friend_service.get_friends(&user.username).await;

    let friends = match friends {
        Ok(friends) => friends,
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_friends", service = "FriendService", username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(friends)))
}

#[post("/me/friends/<username>")]
async fn add_friend(
    sess: SessionContext,
    friend_service: &State<Arc<FriendService>>,
    username: &str,
) -> JsonRes<Success> {
    let added = friend_service.add_friend(&sess.username, username).await;

    match added {
        Ok(()) => {}
        Err(err) => match err {
            AddFriendError::UserNotFound { .. } => {
                return Err(Error::new_dynamic(Status::NotFound, err.to_string()));
            }
            AddFriendError::Validation(err) => {
                return Err(err.into());
            }
            AddFriendError::Error(err) => {
                log::error!(target: "routes::user::controllers", controller = "add_friend", service = "FriendService", sess:serde, username:serde, err:err; "Error returned from service.");
                return Err(Status::InternalServerError.into());
            }
        },
    }

    Ok((Status::Ok, Success::json()))
}

#[delete("/me/friends/<username>")]
async fn remove_friend(
    sess: SessionContext,
    friend_service: &State<Arc<FriendService>>,
    username: &str,
) -> JsonRes<Success> {
    let removed = friend_service.remove_friend(&sess.username, username).await;

    match removed {
        Ok(true) => {}
        Ok(false) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "remove_friend", service = "FriendService", sess:serde, username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    }

    Ok((Status::Ok, Success::json()))
}

#[get("/me/events")]
async fn get_my_events(
    sess: SessionContext,
    event_service: &State<Arc<EventService>>,
) -> JsonRes<Vec<Event>> {
    let events = event_service.get_events_by_owner(&sess.username).await;

    let events = match events {
        Ok(events) => events,
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_my_events", service = "EventService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(events)))
}

#[get("/me/collaborations")]
async fn get_my_collaborations(
    sess: SessionContext,
    event_service: &State<Arc<EventService>>,
) -> JsonRes<Vec<Event>> {
    let events = event_service
        .get_events_by_collaborator(&sess.username)
        .await;

    let events = match events {
        Ok(events) => events,
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_my_collaborations", service = "EventService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(events)))
}

#[get("/me/invitations")]
async fn get_my_invitations(
    sess: SessionContext,
    event_service: &State<Arc<EventService>>,
) -> JsonRes<Vec<Event>> {
    let events = event_service.get_invitations(&sess.username).await;

    let events = match events {
        Ok(events) => events,
        Err(err) => {
            log::error!(target: "routes::user::controllers", controller = "get_my_invitations", service = "EventService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(events)))
}
