use super::dto::{CreatingUserSession, LoggedIn};
use crate::{
    config::AppConfig,
    dto::{JsonRes, Success},
    guards::{SessionContext, SESSION_COOKIE, USERNAME_COOKIE},
    services::AuthService,
};
use rocket::{
    get,
    http::{Cookie, CookieJar, SameSite, Status},
    post, routes,
    serde::json::Json,
    Build, Rocket, State,
};
use std::sync::Arc;

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api", routes![login, logout])
}

#[post("/login", data = "<body>")]
async fn login(
    app_config: &State<AppConfig>,
    auth_service: &State<Arc<AuthService>>,
    cookies: &CookieJar<'_>,
    body: Json<CreatingUserSession>,
) -> JsonRes<LoggedIn> {
    let username = auth_service
        .authenticate_user(&body.username, &body.password)
        .await;

    let username = match username {
        Ok(Some(username)) => username,
        Ok(None) => {
            return Err(Status::Unauthorized.into());
        }
        Err(err) => {
            let username = &body.username;
            log::error!(target: "routes::user_session::controllers", controller = "login", service = "AuthService", username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    let token = auth_service.create_session(&username).await;

    let token = match token {
        Ok(token) => token,
        Err(err) => {
            log::error!(target: "routes::user_session::controllers", controller = "login", service = "AuthService", username:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    cookies.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(app_config.secure_cookies),
    );
    cookies.add(
        Cookie::build((USERNAME_COOKIE, username.clone()))
            .path("/")
            .same_site(SameSite::Lax)
            .secure(app_config.secure_cookies),
    );

    Ok((Status::Ok, Json(LoggedIn { username })))
}

/// Always succeeds. An unknown or missing session only clears the cookies.
#[get("/logout")]
async fn logout(
    sess: Option<SessionContext>,
    auth_service: &State<Arc<AuthService>>,
    cookies: &CookieJar<'_>,
) -> JsonRes<Success> {
    if let Some(sess) = sess {
        if let Err(err) = auth_service.remove_session(&sess.token).await {
            log::error!(target: "routes::user_session::controllers", controller = "logout", service = "AuthService", sess:serde, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    }

    cookies.remove(SESSION_COOKIE);
    cookies.remove(USERNAME_COOKIE);

    Ok((Status::Ok, Success::json()))
}
