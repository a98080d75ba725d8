use crate::{
    db::models::EventCollaborator,
    dto::{Error, JsonRes, Success},
    guards::SessionContext,
    services::{
        CollaboratorService, InviteCollaboratorError, RemoveCollaboratorError,
        RespondInvitationError,
    },
};
use rocket::{delete, get, http::Status, post, put, routes, serde::json::Json, Build, Rocket, State};
use std::sync::Arc;

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/api/event",
        routes![
            get_collaborators,
            invite_collaborator,
            remove_collaborator,
            accept_invitation,
            decline_invitation,
        ],
    )
}

fn respond_invitation_error(
    controller: &'static str,
    sess: &SessionContext,
    event_id: i32,
    err: RespondInvitationError,
) -> Error {
    match err {
        RespondInvitationError::NotInvited { .. } => {
            Error::new_dynamic(Status::NotFound, err.to_string())
        }
        RespondInvitationError::Error(err) => {
            log::error!(target: "routes::collaborator::controllers", controller, service = "CollaboratorService", sess:serde, event_id, err:err; "Error returned from service.");
            Status::InternalServerError.into()
        }
    }
}

#[get("/<event_id>/users")]
async fn get_collaborators(
    #[allow(unused_variables)] sess: SessionContext,
    collaborator_service: &State<Arc<CollaboratorService>>,
    event_id: i32,
) -> JsonRes<Vec<EventCollaborator>> {
    let collaborators = collaborator_service.get_collaborators(event_id).await;

    let collaborators = match collaborators {
        Ok(Some(collaborators)) => collaborators,
        Ok(None) => {
            return Err(Status::NotFound.into());
        }
        Err(err) => {
            log::error!(target: "routes::collaborator::controllers", controller = "get_collaborators", service = "CollaboratorService", event_id, err:err; "Error returned from service.");
            return Err(Status::InternalServerError.into());
        }
    };

    Ok((Status::Ok, Json(collaborators)))
}

#[post("/<event_id>/users/<username>")]
async fn invite_collaborator(
    sess: SessionContext,
    collaborator_service: &State<Arc<CollaboratorService>>,
    event_id: i32,
    username: &str,
) -> JsonRes<Success> {
    let collaborator = collaborator_service
        .invite_collaborator(event_id, &sess.username, username)
        .await;

    match collaborator {
        Ok(_) => {}
        Err(err) => match err {
            InviteCollaboratorError::EventNotFound { .. }
            | InviteCollaboratorError::UserNotFound { .. } => {
                return Err(Error::new_dynamic(Status::NotFound, err.to_string()));
            }
            InviteCollaboratorError::NotOwner { .. } => {
                return Err(Error::new_dynamic(Status::Forbidden, err.to_string()));
            }
            InviteCollaboratorError::InviteOwner => {
                return Err(Error::new_dynamic(
                    Status::UnprocessableEntity,
                    err.to_string(),
                ));
            }
            InviteCollaboratorError::AlreadyInvited { .. } => {
                return Err(Error::new_dynamic(Status::Conflict, err.to_string()));
            }
            InviteCollaboratorError::Error(err) => {
                log::error!(target: "routes::collaborator::controllers", controller = "invite_collaborator", service = "CollaboratorService", sess:serde, event_id, username:serde, err:err; "Error returned from service.");
                return Err(Status::InternalServerError.into());
            }
        },
    }

    Ok((Status::Ok, Success::json()))
}

#[delete("/<event_id>/users/<username>")]
async fn remove_collaborator(
    sess: SessionContext,
    collaborator_service: &State<Arc<CollaboratorService>>,
    event_id: i32,
    username: &str,
) -> JsonRes<Success> {
    let collaborator = collaborator_service
        .remove_collaborator(event_id, &sess.username, username)
        .await;

    match collaborator {
        Ok(_) => {}
        Err(err) => match err {
            RemoveCollaboratorError::EventNotFound { .. }
            | RemoveCollaboratorError::NotInvited { .. } => {
                return Err(Error::new_dynamic(Status::NotFound, err.to_string()));
            }
            RemoveCollaboratorError::NotAllowed => {
                return Err(Error::new_dynamic(Status::Forbidden, err.to_string()));
            }
            RemoveCollaboratorError::Error(err) => {
                log::error!(target: "routes::collaborator::controllers", controller = "remove_collaborator", service = "CollaboratorService", sess:serde, event_id, username:serde, err:err; "Error returned from service.");
                return Err(Status::InternalServerError.into());
            }
        },
    }

    Ok((Status::Ok, Success::json()))
}

#[put("/<event_id>/accept")]
async fn accept_invitation(
    sess: SessionContext,
    collaborator_service: &State<Arc<CollaboratorService>>,
    event_id: i32,
) -> JsonRes<EventCollaborator> {
    let collaborator = collaborator_service
        .accept_invitation(event_id, &sess.username)
        .await;

    let collaborator = match collaborator {
        Ok(collaborator) => collaborator,
        Err(err) => {
            return Err(respond_invitation_error(
                "accept_invitation",
                &sess,
                event_id,
                err,
            ))
        }
    };

    Ok((Status::Ok, Json(collaborator)))
}

#[put("/<event_id>/decline")]
async fn decline_invitation(
    sess: SessionContext,
    collaborator_service: &State<Arc<CollaboratorService>>,
    event_id: i32,
) -> JsonRes<EventCollaborator> {
    let collaborator = collaborator_service
        .decline_invitation(event_id, &sess.username)
        .await;

    let collaborator = match collaborator {
        Ok(collaborator) => collaborator,
        Err(err) => {
            return Err(respond_invitation_error(
                "decline_invitation",
                &sess,
                event_id,
                err,
            ))
        }
    };

    Ok((Status::Ok, Json(collaborator)))
}
