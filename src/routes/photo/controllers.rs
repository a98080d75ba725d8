use crate::{
    config::AppConfig,
    db::models::Photo,
    dto::{Error, ImageData, JsonRes, Success},
    guards::SessionContext,
    routes::read_image_body,
    services::{PhotoError, PhotoService},
};
use rocket::{
    delete, get, http::Status, post, routes, serde::json::Json, Build, Data, Rocket, State,
};
use std::sync::Arc;

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/api/event",
        routes![get_photos, add_photo, get_photo, remove_photo],
    )
}

fn photo_error(
    controller: &'static str,
    sess: &SessionContext,
    event_id: i32,
    err: PhotoError,
) -> Error {
    match err {
        PhotoError::EventNotFound { .. } | PhotoError::PhotoNotFound { .. } => {
            Error::new_dynamic(Status::NotFound, err.to_string())
        }
        PhotoError::NotMember { .. } => Error::new_dynamic(Status::Forbidden, err.to_string()),
        PhotoError::Validation(err) => err.into(),
        PhotoError::Error(err) => {
            log::error!(target: "routes::photo::controllers", controller, service = "PhotoService", sess:serde, event_id, err:err; "Error returned from service.");
            Status::InternalServerError.into()
        }
    }
}

#[get("/<event_id>/photos")]
async fn get_photos(
    #[allow(unused_variables)] sess: SessionContext,
    photo_service: &State<Arc<PhotoService>>,
    event_id: i32,
) -> JsonRes<Vec<Photo>> {
    let photos = photo_service.get_photos(event_id).await;

    let photos = match photos {
        Ok(Some(photos)) => photos,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::photo::controllers", controller = "get_photos", service = "PhotoService", event_id, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(photos)))
}

#[post("/<event_id>/photos", data = "<body>")]
async fn add_photo(
    sess: SessionContext,
    app_config: &State<AppConfig>,
    photo_service: &State<Arc<PhotoService>>,
    event_id: i32,
    body: Data<'_>,
) -> JsonRes<Photo> {
    let data = read_image_body(body, app_config.image_limit()).await?;
    let photo = photo_service
        .add_photo(event_id, &sess.username, &data)
        .await;

    let photo = match photo {
        Ok(photo) => photo,
        Err(err) => return Err(photo_error("add_photo", &sess, event_id, err)),
    };

    Ok((Status::Created, Json(photo)))
}

#[get("/<event_id>/photos/<photo_id>")]
async fn get_photo(
    #[allow(unused_variables)] sess: SessionContext,
    photo_service: &State<Arc<PhotoService>>,
    event_id: i32,
    photo_id: i32,
) -> Result<ImageData, Error> {
    let image = photo_service.get_photo_data(event_id, photo_id).await;

    let image = match image {
        Ok(Some(image)) => image,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::photo::controllers", controller = "get_photo", service = "PhotoService", event_id, photo_id, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok(ImageData::new(&image.mime, image.data))
}

#[delete("/<event_id>/photos/<photo_id>")]
async fn remove_photo(
    sess: SessionContext,
    photo_service: &State<Arc<PhotoService>>,
    event_id: i32,
    photo_id: i32,
) -> JsonRes<Success> {
    let photo = photo_service
        .remove_photo(event_id, photo_id, &sess.username)
        .await;

    if let Err(err) = photo {
        return Err(photo_error("remove_photo", &sess, event_id, err));
    }

    Ok((Status::Ok, Success::json()))
}
