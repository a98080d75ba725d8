use crate::dto::Patch;
use serde::{Deserialize, Serialize};

/// Times are milliseconds since the Unix epoch.
#[derive(Serialize, Deserialize, Debug)]
pub struct CreatingEvent {
    #[serde(alias = "eventName")]
    pub name: String,
    pub start: i64,
    pub end: i64,
    pub location_lat: f64,
    pub location_lon: f64,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdatingEvent {
    #[serde(default, alias = "eventName")]
    pub name: Patch<String>,
    #[serde(default)]
    pub start: Patch<i64>,
    #[serde(default)]
    pub end: Patch<i64>,
    #[serde(default)]
    pub location_lat: Patch<f64>,
    #[serde(default)]
    pub location_lon: Patch<f64>,
}
