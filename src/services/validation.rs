use std::ops::RangeInclusive;
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 32;
pub const USER_NAME_MAX_LEN: usize = 64;
pub const PRONOUNS_MAX_LEN: usize = 32;
pub const BIO_MAX_LEN: usize = 1024;
pub const EVENT_NAME_MAX_LEN: usize = 128;

/// Usernames that collide with static route segments such as `/user/me`.
pub const RESERVED_USERNAMES: &[&str] = &["me"];

pub const AGE_RANGE: RangeInclusive<i32> = 1..=99;
pub const YEAR_RANGE: RangeInclusive<i32> = 2022..=2040;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("username must be 1 to {max} characters of `a-z`, `0-9`, `_`, `.` or `-`")]
    InvalidUsername { max: usize },
    #[error("username `{username}` is reserved")]
    ReservedUsername { username: String },
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("`{field}` must not be blank")]
    BlankField { field: &'static str },
    #[error("`{field}` must not be null")]
    NullField { field: &'static str },
    #[error("`{field}` must be at most {max} characters long")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("age {age} is out of range, it must be between 1 and 99")]
    AgeOutOfRange { age: i32 },
    #[error("year {year} is out of range, it must be between 2022 and 2040")]
    YearOutOfRange { year: i32 },
    #[error("the event must start before it ends (start {start}, end {end})")]
    InvalidTimeWindow { start: i64, end: i64 },
    #[error("latitude {latitude} is out of range, it must be between -90 and 90")]
    LatitudeOutOfRange { latitude: f64 },
    #[error("longitude {longitude} is out of range, it must be between -180 and 180")]
    LongitudeOutOfRange { longitude: f64 },
    #[error("the uploaded data is not a supported image")]
    NotAnImage,
    #[error("the uploaded image is empty")]
    EmptyImage,
    #[error("a user cannot befriend themselves")]
    SelfFriendship,
}

/// Lower-cases a username so lookups and uniqueness ignore case.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Expects an already normalized username.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid_len = !username.is_empty() && username.chars().count() <= USERNAME_MAX_LEN;
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'));

    if !valid_len || !valid_chars {
        return Err(ValidationError::InvalidUsername {
            max: USERNAME_MAX_LEN,
        });
    }

    if RESERVED_USERNAMES.contains(&username) {
        return Err(ValidationError::ReservedUsername {
            username: username.to_owned(),
        });
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }

    Ok(())
}

pub fn validate_required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }

    validate_optional_text(field, Some(value), max)
}

pub fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) if value.chars().count() > max => {
            Err(ValidationError::FieldTooLong { field, max })
        }
        _ => Ok(()),
    }
}

pub fn validate_age(age: Option<i32>) -> Result<(), ValidationError> {
    match age {
        Some(age) if !AGE_RANGE.contains(&age) => Err(ValidationError::AgeOutOfRange { age }),
        _ => Ok(()),
    }
}

pub fn validate_year(year: Option<i32>) -> Result<(), ValidationError> {
    match year {
        Some(year) if !YEAR_RANGE.contains(&year) => {
            Err(ValidationError::YearOutOfRange { year })
        }
        _ => Ok(()),
    }
}

pub fn validate_time_window(start: i64, end: i64) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::InvalidTimeWindow { start, end });
    }

    Ok(())
}

/// NaN and infinities fall outside both ranges.
pub fn validate_location(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !LATITUDE_RANGE.contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange { latitude });
    }

    if !LONGITUDE_RANGE.contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange { longitude });
    }

    Ok(())
}

/// Profile fields shared by user creation and update.
pub struct UserFields<'a> {
    pub name: &'a str,
    pub pronouns: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub age: Option<i32>,
    pub year: Option<i32>,
}

pub fn validate_user_fields(fields: &UserFields<'_>) -> Result<(), ValidationError> {
    validate_required_text("name", fields.name, USER_NAME_MAX_LEN)?;
    validate_optional_text("pronouns", fields.pronouns, PRONOUNS_MAX_LEN)?;
    validate_optional_text("bio", fields.bio, BIO_MAX_LEN)?;
    validate_age(fields.age)?;
    validate_year(fields.year)?;
    Ok(())
}

/// Event fields shared by event creation and update.
pub struct EventFields<'a> {
    pub name: &'a str,
    pub start_time: i64,
    pub end_time: i64,
    pub location_lat: f64,
    pub location_lon: f64,
}

pub fn validate_event_fields(fields: &EventFields<'_>) -> Result<(), ValidationError> {
    validate_required_text("name", fields.name, EVENT_NAME_MAX_LEN)?;
    validate_time_window(fields.start_time, fields.end_time)?;
    validate_location(fields.location_lat, fields.location_lon)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("Ada"), "ada");
        assert_eq!(normalize_username("  SAMMY_Slug "), "sammy_slug");
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada").is_ok());
        assert!(validate_username("sammy.slug-2025_x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("Ada").is_err());
        assert!(validate_username("ada lovelace").is_err());
        assert!(validate_username("ada/../me").is_err());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LEN)).is_ok());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LEN + 1)).is_err());
        assert_eq!(
            validate_username("me"),
            Err(ValidationError::ReservedUsername {
                username: "me".to_owned()
            })
        );
    }

    #[test]
    fn test_validate_age_bounds() {
        assert!(validate_age(None).is_ok());
        assert!(validate_age(Some(1)).is_ok());
        assert!(validate_age(Some(99)).is_ok());
        assert_eq!(
            validate_age(Some(0)),
            Err(ValidationError::AgeOutOfRange { age: 0 })
        );
        assert_eq!(
            validate_age(Some(100)),
            Err(ValidationError::AgeOutOfRange { age: 100 })
        );
        assert!(validate_age(Some(-5)).is_err());
    }

    #[test]
    fn test_validate_year_bounds() {
        assert!(validate_year(None).is_ok());
        assert!(validate_year(Some(2022)).is_ok());
        assert!(validate_year(Some(2040)).is_ok());
        assert_eq!(
            validate_year(Some(2021)),
            Err(ValidationError::YearOutOfRange { year: 2021 })
        );
        assert_eq!(
            validate_year(Some(2041)),
            Err(ValidationError::YearOutOfRange { year: 2041 })
        );
    }

    #[test]
    fn test_validate_time_window() {
        assert!(validate_time_window(0, 1).is_ok());
        assert!(validate_time_window(5, 5).is_err());
        assert!(validate_time_window(10, 5).is_err());
    }

    #[test]
    fn test_validate_location() {
        assert!(validate_location(36.97, -122.03).is_ok());
        assert!(validate_location(-90.0, 180.0).is_ok());
        assert!(validate_location(90.0, -180.0).is_ok());
        assert!(matches!(
            validate_location(90.5, 0.0),
            Err(ValidationError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            validate_location(0.0, -180.1),
            Err(ValidationError::LongitudeOutOfRange { .. })
        ));
        assert!(validate_location(f64::NAN, 0.0).is_err());
        assert!(validate_location(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_user_fields() {
        let fields = UserFields {
            name: "Ada L",
            pronouns: Some("she/her"),
            bio: None,
            age: Some(30),
            year: Some(2025),
        };
        assert!(validate_user_fields(&fields).is_ok());

        let fields = UserFields {
            name: "   ",
            ..fields
        };
        assert_eq!(
            validate_user_fields(&fields),
            Err(ValidationError::BlankField { field: "name" })
        );

        let long_bio = "x".repeat(BIO_MAX_LEN + 1);
        let fields = UserFields {
            name: "Ada",
            pronouns: None,
            bio: Some(&long_bio),
            age: None,
            year: None,
        };
        assert_eq!(
            validate_user_fields(&fields),
            Err(ValidationError::FieldTooLong {
                field: "bio",
                max: BIO_MAX_LEN
            })
        );
    }

    #[test]
    fn test_validate_event_fields() {
        let fields = EventFields {
            name: "Beach cleanup",
            start_time: 1_700_000_000_000,
            end_time: 1_700_003_600_000,
            location_lat: 36.96,
            location_lon: -122.02,
        };
        assert!(validate_event_fields(&fields).is_ok());

        let fields = EventFields {
            end_time: fields.start_time,
            ..fields
        };
        assert!(matches!(
            validate_event_fields(&fields),
            Err(ValidationError::InvalidTimeWindow { .. })
        ));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        assert_eq!(
            ValidationError::AgeOutOfRange { age: 120 }.to_string(),
            "age 120 is out of range, it must be between 1 and 99"
        );
        assert_eq!(
            ValidationError::InvalidTimeWindow { start: 5, end: 1 }.to_string(),
            "the event must start before it ends (start 5, end 1)"
        );
    }
}
