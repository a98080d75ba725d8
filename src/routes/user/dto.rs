use crate::dto::Patch;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatingUser {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Absent keys keep their value, `null` clears optional fields.
#[derive(Deserialize, Debug, Default)]
pub struct UpdatingUser {
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub pronouns: Patch<String>,
    #[serde(default)]
    pub bio: Patch<String>,
    #[serde(default)]
    pub age: Patch<i32>,
    #[serde(default)]
    pub year: Patch<i32>,
}
