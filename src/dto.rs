use rocket::{
    http::{ContentType, Status},
    serde::json::Json,
    Responder,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Deref;

#[derive(Responder, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ErrorBodyKind {
    Static(&'static str),
    Dynamic(String),
}

#[derive(Responder, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[response(content_type = "json")]
pub struct ErrorBody {
    pub error: ErrorBodyKind,
}

/// Every failed request answers with `{"error": "<message>"}` and a matching status.
#[derive(Responder, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error((Status, Json<ErrorBody>));

impl Error {
    pub fn new_static(status: Status, message: &'static str) -> Self {
        Error((
            status,
            Json(ErrorBody {
                error: ErrorBodyKind::Static(message),
            }),
        ))
    }

    pub fn new_dynamic(status: Status, message: impl Into<String>) -> Self {
        Error((
            status,
            Json(ErrorBody {
                error: ErrorBodyKind::Dynamic(message.into()),
            }),
        ))
    }

    pub fn status(&self) -> Status {
        self.0 .0
    }

    pub fn message(&self) -> &str {
        match &self.0 .1.error {
            ErrorBodyKind::Static(message) => *message,
            ErrorBodyKind::Dynamic(message) => message.as_str(),
        }
    }
}

impl From<Status> for Error {
    fn from(value: Status) -> Self {
        let message = match value.code {
            400 => "bad request",
            401 => "unauthorized",
            403 => "forbidden",
            404 => "not found",
            405 => "method not allowed",
            406 => "not acceptable",
            408 => "request timeout",
            409 => "conflict",
            411 => "length required",
            413 => "payload too large",
            415 => "unsupported media type",
            422 => "unprocessable entity",
            429 => "too many requests",
            431 => "request header fields too large",
            500 => "internal server error",
            501 => "not implemented",
            503 => "service unavailable",
            _ => "unknown",
        };

        Self::new_static(value, message)
    }
}

pub type JsonRes<T> = Result<(Status, Json<T>), Error>;

/// Body of operations that have nothing else to return.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn json() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Raw image bytes served with their own content type.
#[derive(Responder, Debug)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub content_type: ContentType,
}

impl ImageData {
    pub fn new(mime: &str, data: Vec<u8>) -> Self {
        let content_type = ContentType::parse_flexible(mime).unwrap_or(ContentType::Binary);
        Self { data, content_type }
    }
}

/// A field of a partial update.
///
/// `Missing` when the key is absent, `Null` when it is `null`, `Value` otherwise.
/// Fields of this type must be marked `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T>
where
    T: Deref,
{
    pub fn as_deref(&self) -> Patch<&T::Target> {
        match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(value.deref()),
        }
    }
}

impl<T> Patch<T> {
    /// Merges into a nullable column: absent keeps `current`, `null` clears it.
    pub fn merge(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Missing => current,
            Patch::Null => None,
            Patch::Value(value) => Some(value),
        }
    }

    /// Merges into a required column. `None` when the request sent `null`.
    pub fn merge_required(self, current: T) -> Option<T> {
        match self {
            Patch::Missing => Some(current),
            Patch::Null => None,
            Patch::Value(value) => Some(value),
        }
    }
}
