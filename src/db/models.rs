use chrono::NaiveDateTime;
use diesel::{
    associations::Identifiable, deserialize::Queryable, prelude::Insertable,
    query_builder::AsChangeset, Selectable,
};
use serde::{Deserialize, Serialize};

/// Public view of a user. The password hash is never part of it.
#[derive(Serialize, Deserialize, Selectable, Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::users)]
#[diesel(primary_key(username))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub username: String,
    pub name: String,
    pub pronouns: Option<String>,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub year: Option<i32>,
    pub pfp: Option<i32>,
    pub joined_at: NaiveDateTime,
}

#[derive(Selectable, Queryable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserWithPassword {
    pub username: String,
    pub password: String,
}

/// Every writable column of a user row, used to merge partial updates.
#[derive(Selectable, Queryable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub username: String,
    pub password: String,
    pub name: String,
    pub pronouns: Option<String>,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub pronouns: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub age: Option<i32>,
    pub year: Option<i32>,
}

#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct UpdatingUser<'a> {
    pub password: &'a str,
    pub name: &'a str,
    pub pronouns: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub age: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::pfps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingProfilePicture<'a> {
    pub mime: &'a str,
    pub data: &'a [u8],
}

/// Raw image bytes together with their sniffed mime type.
#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub mime: String,
    pub data: Vec<u8>,
}

#[derive(Serialize, Deserialize, Selectable, Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Event {
    pub id: i32,
    #[serde(rename = "eventName")]
    pub name: String,
    pub owner: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "start")]
    pub start_time: i64,
    /// Milliseconds since the Unix epoch, always after `start_time`.
    #[serde(rename = "end")]
    pub end_time: i64,
    pub location_lat: f64,
    pub location_lon: f64,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingEvent<'a> {
    pub name: &'a str,
    pub owner: &'a str,
    pub start_time: i64,
    pub end_time: i64,
    pub location_lat: f64,
    pub location_lon: f64,
}

#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdatingEvent<'a> {
    pub name: &'a str,
    pub start_time: i64,
    pub end_time: i64,
    pub location_lat: f64,
    pub location_lon: f64,
}

#[derive(Serialize, Deserialize, Selectable, Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::event_collaborators)]
#[diesel(primary_key(event_id, username))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventCollaborator {
    pub event_id: i32,
    pub username: String,
    pub accepted: bool,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::event_collaborators)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingEventCollaborator<'a> {
    pub event_id: i32,
    pub username: &'a str,
}

/// Photo metadata. The image bytes are loaded separately.
#[derive(Serialize, Deserialize, Selectable, Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Photo {
    pub id: i32,
    pub event_id: i32,
    pub mime: String,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingPhoto<'a> {
    pub event_id: i32,
    pub mime: &'a str,
    pub data: &'a [u8],
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::user_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingUserSession<'a> {
    pub token: &'a str,
    pub username: &'a str,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatingFriendship<'a> {
    pub username: &'a str,
    pub friend_username: &'a str,
}
