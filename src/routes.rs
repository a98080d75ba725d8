pub mod collaborator {
    pub mod controllers;
    #[cfg(test)]
    mod tests;
}

pub mod event {
    pub mod controllers;
    pub mod dto;
    #[cfg(test)]
    mod tests;
}

pub mod photo {
    pub mod controllers;
    #[cfg(test)]
    mod tests;
}

pub mod user {
    pub mod controllers;
    pub mod dto;
    #[cfg(test)]
    mod tests;
}

pub mod user_session {
    pub mod controllers;
    pub mod dto;
    #[cfg(test)]
    mod tests;
}

use crate::{dto::Error, services::ValidationError};
use rocket::{data::ByteUnit, http::Status, Build, Data, Rocket};

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    let rocket = user::controllers::register_routes(rocket);
    let rocket = user_session::controllers::register_routes(rocket);
    let rocket = event::controllers::register_routes(rocket);
    let rocket = collaborator::controllers::register_routes(rocket);
    let rocket = photo::controllers::register_routes(rocket);
    rocket
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::new_dynamic(Status::UnprocessableEntity, err.to_string())
    }
}

/// Reads a raw image upload into memory. Bodies larger than `limit` are rejected with `413`.
pub async fn read_image_body(body: Data<'_>, limit: ByteUnit) -> Result<Vec<u8>, Error> {
    let data = match body.open(limit).into_bytes().await {
        Ok(data) => data,
        Err(err) => {
            log::error!(target: "routes", limit:%, err:err; "Failed to read request body.");
            return Err(Status::InternalServerError.into());
        }
    };

    if !data.is_complete() {
        return Err(Error::new_dynamic(
            Status::PayloadTooLarge,
            format!("the image exceeds the maximum size of {}", limit),
        ));
    }

    Ok(data.into_inner())
}
