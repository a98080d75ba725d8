use crate::{
    db::models::Photo,
    services::{
        test::{JPEG_BYTES, PNG_BYTES},
        AuthService, CollaboratorService, EventService, PhotoService, UserService,
    },
    test::{
        create_test_rocket_instance,
        helpers::{bearer, create_event, create_user, create_user_with_session},
    },
};
use rocket::{
    http::{Accept, ContentType, Status},
    local::asynchronous::Client,
};
use std::sync::Arc;

#[rocket::async_test]
async fn test_add_and_get_photo() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .post(format!("/api/event/{}/photos", event.id))
        .header(Accept::JSON)
        .header(ContentType::JPEG)
        .header(bearer(&token))
        .body(JPEG_BYTES)
        .dispatch()
        .await;

    let status = response.status();
    let photo = response.into_json::<Photo>().await.unwrap();

    assert_eq!(status, Status::Created);
    assert_eq!(photo.event_id, event.id);
    assert_eq!(photo.mime, "image/jpeg");

    let response = client
        .get(format!("/api/event/{}/photos", event.id))
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;

    let status = response.status();
    let photos = response.into_json::<Vec<Photo>>().await.unwrap();

    assert_eq!(status, Status::Ok);
    assert_eq!(photos, vec![photo.clone()]);

    let response = client
        .get(format!("/api/event/{}/photos/{}", event.id, photo.id))
        .header(bearer(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::JPEG));
    assert_eq!(response.into_bytes().await.unwrap(), JPEG_BYTES);
}

#[rocket::async_test]
async fn test_add_photo_rejects_non_images() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let photo_service = client.rocket().state::<Arc<PhotoService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;

    let response = client
        .post(format!("/api/event/{}/photos", event.id))
        .header(Accept::JSON)
        .header(ContentType::Binary)
        .header(bearer(&token))
        .body("<html></html>")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);

    let photos = photo_service.get_photos(event.id).await.unwrap().unwrap();
    assert!(photos.is_empty());
}

#[rocket::async_test]
async fn test_photos_require_membership() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();
    let event_service = client.rocket().state::<Arc<EventService>>().unwrap();
    let collaborator_service = client
        .rocket()
        .state::<Arc<CollaboratorService>>()
        .unwrap();
    let photo_service = client.rocket().state::<Arc<PhotoService>>().unwrap();

    create_user("ada", user_service).await;
    let (_grace, grace_token) =
        create_user_with_session("grace", auth_service, user_service).await;
    let event = create_event("ada", "Picnic", event_service).await;
    let photo = photo_service
        .add_photo(event.id, "ada", PNG_BYTES)
        .await
        .unwrap();

    collaborator_service
        .invite_collaborator(event.id, "ada", "grace")
        .await
        .unwrap();

    // a pending invitation is not enough
    let response = client
        .post(format!("/api/event/{}/photos", event.id))
        .header(Accept::JSON)
        .header(ContentType::PNG)
        .header(bearer(&grace_token))
        .body(PNG_BYTES)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .delete(format!("/api/event/{}/photos/{}", event.id, photo.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    collaborator_service
        .accept_invitation(event.id, "grace")
        .await
        .unwrap();

    let response = client
        .post(format!("/api/event/{}/photos", event.id))
        .header(Accept::JSON)
        .header(ContentType::PNG)
        .header(bearer(&grace_token))
        .body(PNG_BYTES)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .delete(format!("/api/event/{}/photos/{}", event.id, photo.id))
        .header(Accept::JSON)
        .header(bearer(&grace_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let data = photo_service
        .get_photo_data(event.id, photo.id)
        .await
        .unwrap();
    assert_eq!(data, None);

    let photos = photo_service.get_photos(event.id).await.unwrap().unwrap();
    assert_eq!(photos.len(), 1);
}

#[rocket::async_test]
async fn test_photos_of_missing_event() {
    let (rocket, _database_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();
    let auth_service = client.rocket().state::<Arc<AuthService>>().unwrap();
    let user_service = client.rocket().state::<Arc<UserService>>().unwrap();

    let (_ada, token) = create_user_with_session("ada", auth_service, user_service).await;

    let response = client
        .get("/api/event/999999/photos")
        .header(Accept::JSON)
        .header(bearer(&token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .post("/api/event/999999/photos")
        .header(Accept::JSON)
        .header(ContentType::PNG)
        .header(bearer(&token))
        .body(PNG_BYTES)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}
