use super::dto::CreatingEvent;
use crate::{
    db::models::Event,
    services::{AuthService, CollaboratorService, EventService, UserService},
    test::{
        create_test_rocket_instance,
        helpers::{bearer, create_event, create_user_with_session},
    },
};
use rocket::{
    http::{Accept, ContentType, Status},
    local::asynchronous::Client,
};
use serde_json::{json, Value};
use std::sync::Arc;

#[rocket::async_test]
async fn test_create_event() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;

    let response = client
        .post("/api/event")
        .header(Accept::JSON)
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(
            serde_json::to_string(&CreatingEvent {
                name: "Beach cleanup".to_owned(),
                start: 1_700_000_000_000,
                end: 1_700_007_200_000,
                location_lat: 36.5,
                location_lon: -122.125,
            })
            .unwrap(),
        )
        .dispatch()
        .await;

    let status = response.status();
    let created_event = response.into_json::<Event>().await.unwrap();

    assert_eq!(status, Status::Created);
    assert_eq!(created_event.name, "Beach cleanup");
    assert_eq!(created_event.owner, "ada");
    assert_eq!(created_event.start_time, 1_700_000_000_000);
    assert_eq!(created_event.end_time, 1_700_007_200_000);

    let raw_created_event = event_service
        .get_event_by_id(created_event.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(raw_created_event, created_event);
}

#[rocket::async_test]
async fn test_create_event_accepts_event_name_key() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;

    let response = client
        .post("/api/event")
        .header(Accept::JSON)
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(
            json!({
                "eventName": "Study group",
                "start": 1_000,
                "end": 2_000,
                "location_lat": 0.0,
                "location_lon": 0.0,
            })
            .to_string(),
        )
        .dispatch()
        .await;

    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap();

    assert_eq!(status, Status::Created);
    assert_eq!(body["eventName"], "Study group");
    assert_eq!(body["start"], 1_000);
    assert_eq!(body["end"], 2_000);
}

#[rocket::async_test]
async fn test_create_event_rejects_invalid_fields() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;

    for body in [
        json!({ "name": "Backwards", "start": 2_000, "end": 1_000, "location_lat": 0.0, "location_lon": 0.0 }),
        json!({ "name": "Instant", "start": 1_000, "end": 1_000, "location_lat": 0.0, "location_lon": 0.0 }),
        json!({ "name": "North of north", "start": 1_000, "end": 2_000, "location_lat": 90.5, "location_lon": 0.0 }),
        json!({ "name": "Off the map", "start": 1_000, "end": 2_000, "location_lat": 0.0, "location_lon": -181.0 }),
        json!({ "name": " ", "start": 1_000, "end": 2_000, "location_lat": 0.0, "location_lon": 0.0 }),
    ] {
        let response = client
            .post("/api/event")
            .header(Accept::JSON)
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(body.to_string())
            .dispatch()
            .await;

        let status = response.status();
        let body = response.into_json::<Value>().await.unwrap();

        assert_eq!(status, Status::UnprocessableEntity);
        assert!(body["error"].is_string());
    }

    let events = event_service.get_events_by_owner("ada").await.unwrap();
    assert!(events.is_empty());
}

#[rocket::async_test]
async fn test_get_event() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .get(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    let status = response.status();
    let retrieved_event = response.into_json::<Event>().await.unwrap();

    assert_eq!(status, Status::Ok);
    assert_eq!(retrieved_event, event);

    let response = client
        .get(format!("/api/event/{}", event.id + 1))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_update_event() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .put(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(json!({ "eventName": "Moonlight picnic" }).to_string())
        .dispatch()
        .await;

    let status = response.status();
    let updated_event = response.into_json::<Event>().await.unwrap();

    assert_eq!(status, Status::Ok);
    assert_eq!(updated_event.name, "Moonlight picnic");
    assert_eq!(updated_event.start_time, event.start_time);
    assert_eq!(updated_event.end_time, event.end_time);
    assert_eq!(updated_event.location_lat, event.location_lat);

    // the merged window must still be valid
    let response = client
        .put(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(json!({ "start": event.end_time }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .put(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(ContentType::JSON)
        .header(bearer(&token))
        .body(json!({ "location_lon": null }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);

    let raw_event = event_service
        .get_event_by_id(event.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(raw_event, updated_event);
}

#[rocket::async_test]
async fn test_only_owner_modifies_event() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let collaborator_service = client
        .rocket()
        .state::<Arc<CollaboratorService>>()
        .unwrap();

    create_user_with_session("ada", auth_service, user_service).await;
    let (_grace, grace_token) =
        create_user_with_session("grace", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    // an accepted collaborator is still not the owner
    collaborator_service
        .invite_collaborator(event.id, "ada", "grace")
        .await
        .unwrap();
    collaborator_service
        .accept_invitation(event.id, "grace")
        .await
        .unwrap();

    let response = client
        .put(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(ContentType::JSON)
        .header(bearer(&grace_token))
        .body(json!({ "eventName": "Hijacked" }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .delete(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Forbidden);

    let raw_event = event_service
        .get_event_by_id(event.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(raw_event, event);
}

#[rocket::async_test]
async fn test_remove_event() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .delete(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);

    let raw_event = event_service.get_event_by_id(event.id).await.unwrap();
    assert_eq!(raw_event, None);

    let response = client
        .delete(format!("/api/event/{}", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::NotFound);
}
