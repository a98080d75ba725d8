use crate::{
    db::models::{Event, EventCollaborator},
    services::{AuthService, CollaboratorService, EventService, UserService},
    test::{
        create_test_rocket_instance,
        helpers::{bearer, create_event, create_user, create_user_with_session},
    },
};
use rocket::{
    http::{Accept, Status},
    local::asynchronous::Client,
};
use std::sync::Arc;

#[rocket::async_test]
async fn test_invite_collaborator() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let collaborator_service = client
        .rocket()
        .state::<Arc<CollaboratorService>>()
        .unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    create_user("grace", user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .post(format!("/api/event/{}/users/Grace", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);

    let collaborators = collaborator_service
        .get_collaborators(event.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        collaborators,
        vec![EventCollaborator {
            event_id: event.id,
            username: "grace".to_owned(),
            accepted: false,
        }]
    );

    let response = client
        .post(format!("/api/event/{}/users/grace", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Conflict);

    let response = client
        .post(format!("/api/event/{}/users/nobody", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_invite_owner_is_rejected() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let collaborator_service = client
        .rocket()
        .state::<Arc<CollaboratorService>>()
        .unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .post(format!("/api/event/{}/users/ada", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);

    let collaborators = collaborator_service
        .get_collaborators(event.id)
        .await
        .unwrap()
        .unwrap();

    assert!(collaborators.is_empty());
}

#[rocket::async_test]
async fn test_only_owner_invites() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    create_user("ada", user_service).await;
    let (_grace, grace_token) =
        create_user_with_session("grace", auth_service, user_service).await;
    create_user("linus", user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .post(format!("/api/event/{}/users/linus", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post("/api/event/999999/users/linus")
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_accept_and_decline_invitation() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let collaborator_service = client
        .rocket()
        .state::<Arc<CollaboratorService>>()
        .unwrap();

    create_user("ada", user_service).await;
    let (_grace, grace_token) =
        create_user_with_session("grace", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    collaborator_service
        .invite_collaborator(event.id, "ada", "grace")
        .await
        .unwrap();

    let response = client
        .get("/api/user/me/invitations")
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    let invitations = response.into_json::<Vec<Event>>().await.unwrap();
    assert_eq!(invitations, vec![event.clone()]);

    let response = client
        .put(format!("/api/event/{}/accept", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    let status = response.status();
    let collaborator = response.into_json::<EventCollaborator>().await.unwrap();

    assert_eq!(status, Status::Ok);
    assert!(collaborator.accepted);

    let collaborations = event_service
        .get_events_by_collaborator("grace")
        .await
        .unwrap();
    assert_eq!(collaborations, vec![event.clone()]);

    let invitations = event_service.get_invitations("grace").await.unwrap();
    assert!(invitations.is_empty());

    let response = client
        .put(format!("/api/event/{}/decline", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    let status = response.status();
    let collaborator = response.into_json::<EventCollaborator>().await.unwrap();

    assert_eq!(status, Status::Ok);
    assert!(!collaborator.accepted);

    let response = client
        .get("/api/user/me/collaborations")
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    let collaborations = response.into_json::<Vec<Event>>().await.unwrap();
    assert!(collaborations.is_empty());
}

#[rocket::async_test]
async fn test_accept_without_invitation() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    create_user("ada", user_service).await;
    let (_grace, grace_token) =
        create_user_with_session("grace", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .put(format!("/api/event/{}/accept", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_remove_collaborator() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let collaborator_service = client
        .rocket()
        .state::<Arc<CollaboratorService>>()
        .unwrap();

    let (_ada, ada_token) = create_user_with_session("ada", auth_service, user_service).await;
    let (_grace, grace_token) =
        create_user_with_session("grace", auth_service, user_service).await;
    create_user("linus", user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    for username in ["grace", "linus"] {
        collaborator_service
            .invite_collaborator(event.id, "ada", username)
            .await
            .unwrap();
    }

    // collaborators may only remove themselves
    let response = client
        .delete(format!("/api/event/{}/users/linus", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .delete(format!("/api/event/{}/users/grace", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .delete(format!("/api/event/{}/users/linus", event.id))
        .header(Accept::JSON)
        .header(bearer(&ada_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get(format!("/api/event/{}/users", event.id))
        .header(Accept::JSON)
        .header(bearer(&ada_token))
        .dispatch()
        .await;

    let status = response.status();
    let collaborators = response
        .into_json::<Vec<EventCollaborator>>()
        .await
        .unwrap();

    assert_eq!(status, Status::Ok);
    assert!(collaborators.is_empty());
}
