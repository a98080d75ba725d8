use crate::{dto::Error, services::AuthService};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome, Request},
    State,
};
use serde::Serialize;
use std::sync::Arc;

/// Http-only cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";
/// Script-readable cookie carrying the username. Informational only, never trusted.
pub const USERNAME_COOKIE: &str = "username";

/// The identity behind the current request.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: String,
    #[serde(skip)]
    pub token: String,
}

fn parse_authorization_header(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}

/// Session tokens carried by the request, the cookie first and then the bearer header.
fn session_tokens(request: &Request<'_>) -> Vec<String> {
    let mut tokens = Vec::with_capacity(2);

    if let Some(cookie) = request.cookies().get(SESSION_COOKIE) {
        tokens.push(cookie.value().to_owned());
    }

    if let Some(token) = request
        .headers()
        .get_one("Authorization")
        .and_then(parse_authorization_header)
    {
        if !tokens.iter().any(|cookie_token| cookie_token == token) {
            tokens.push(token.to_owned());
        }
    }

    tokens
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionContext {
    type Error = Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let tokens = session_tokens(request);

        if tokens.is_empty() {
            return Outcome::Error((Status::Unauthorized, Status::Unauthorized.into()));
        }

        let auth_service = match request.guard::<&State<Arc<AuthService>>>().await {
            Outcome::Success(auth_service) => auth_service,
            Outcome::Error(_) => {
                log::error!(target: "guards::SessionContext", guard = "SessionContext"; "Failed to get AuthService from request guard.");
                return Outcome::Error((
                    Status::InternalServerError,
                    Status::InternalServerError.into(),
                ));
            }
            Outcome::Forward(status) => {
                return Outcome::Forward(status);
            }
        };

        // a stale cookie must not shadow a valid bearer token
        for token in tokens {
            match auth_service.get_username_from_session(&token).await {
                Ok(Some(username)) => return Outcome::Success(SessionContext { username, token }),
                Ok(None) => continue,
                Err(err) => {
                    log::error!(target: "guards::SessionContext", guard = "SessionContext", service = "AuthService", err:err; "Failed to resolve session.");
                    return Outcome::Error((
                        Status::InternalServerError,
                        Status::InternalServerError.into(),
                    ));
                }
            }
        }

        Outcome::Error((Status::Unauthorized, Status::Unauthorized.into()))
    }
}
