use super::dto::{CreatingEvent, UpdatingEvent};
use crate::{
    db::models::Event,
    dto::{Error, JsonRes, Success},
    guards::SessionContext,
    services::{CreateEventError, EventPatch, EventService, ModifyEventError, NewEvent},
};
use rocket::{delete, get, http::Status, post, put, routes, serde::json::Json, Build, Rocket, State};
use std::sync::Arc;

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/api/event",
        routes![create_event, get_event, update_event, remove_event],
    )
}

fn modify_event_error(
    controller: &'static str,
    sess: &SessionContext,
    event_id: i32,
    err: ModifyEventError,
) -> Error {
    match err {
        ModifyEventError::NotFound { .. } => Error::new_dynamic(Status::NotFound, err.to_string()),
        ModifyEventError::NotOwner { .. } => Error::new_dynamic(Status::Forbidden, err.to_string()),
        ModifyEventError::Validation(err) => err.into(),
        ModifyEventError::Error(err) => {
            log::error!(target: "routes::event::controllers", controller, service = "EventService", sess:serde, event_id, err:err; "Error returned from service.");
            Status::InternalServerError.into()
        }
    }
}

#[post("/", data = "<body>")]
async fn create_event(
    sess: SessionContext,
    event_service: &State<Arc<EventService>>,
    body: Json<CreatingEvent>,
) -> JsonRes<Event> {
    let event = event_service
        .create_event(
            &sess.username,
            NewEvent {
                name: &body.name,
                start_time: body.start,
                end_time: body.end,
                location_lat: body.location_lat,
                location_lon: body.location_lon,
            },
        )
        .await;

    let event = match event {
        Ok(event) => event,
        Err(err) => match err {
            CreateEventError::OwnerNotFound { .. } => {
                return Err(Status::Unauthorized.into());
            }
            CreateEventError::Validation(err) => {
                return Err(err.into());
            }
            CreateEventError::Error(err) => {
                let body = body.into_inner();
                log::error!(target: "routes::event::controllers", controller = "create_event", service = "EventService", sess:serde, body:serde, err:err; "Error returned from service.");
                return Err(Status::InternalServerError.into());
            }
        },
    };

    Ok((Status::Created, Json(event)))
}

#[get("/<event_id>")]
async fn get_event(
    #[allow(unused_variables)] sess: SessionContext,
    event_service: &State<Arc<EventService>>,
    event_id: i32,
) -> JsonRes<Event> {
    let event = event_service.get_event_by_id(event_id).await;

    let event = match event {
        Ok(Some(event)) => event,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::event::controllers", controller = "get_event", service = "EventService", event_id, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(event)))
}

#[put("/<event_id>", data = "<body>")]
async fn update_event(
    sess: SessionContext,
    event_service: &State<Arc<EventService>>,
    event_id: i32,
    body: Json<UpdatingEvent>,
) -> JsonRes<Event> {
    let event = event_service
        .update_event(
            event_id,
            &sess.username,
            EventPatch {
                name: body.name.as_deref(),
                start_time: body.start.clone(),
                end_time: body.end.clone(),
                location_lat: body.location_lat.clone(),
                location_lon: body.location_lon.clone(),
            },
        )
        .await;

    let event = match event {
        Ok(event) => event,
        Err(err) => return Err(modify_event_error("update_event", &sess, event_id, err)),
    };

    Ok((Status::Ok, Json(event)))
}

#[delete("/<event_id>")]
async fn remove_event(
    sess: SessionContext,
    event_service: &State<Arc<EventService>>,
    event_id: i32,
) -> JsonRes<Success> {
    let event = event_service.remove_event(event_id, &sess.username).await;

    if let Err(err) = event {
        return Err(modify_event_error("remove_event", &sess, event_id, err));
    }

    Ok((Status::Ok, Success::json()))
}
