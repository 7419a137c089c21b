//! # Validation Module
//!
//! Inspects caller-supplied dog field sets before anything reaches the store.
//!
//! A body is checked against the allow-list `name`, `description`, `breed`,
//! `age`. Every problem is collected, never short-circuited, so a client sees
//! all of its mistakes in one 400 response:
//!
//! - a known field with the wrong JSON type (`"age should be a number"`)
//! - a required field missing on create (reported with the same type message)
//! - any key outside the allow-list (`"'colour' is not a valid key"`)
//!
//! Violations are ordered by schema field (`name`, `description`, `breed`,
//! `age`) and then by unknown key.
//!
//! On success the body is normalized into [`NewDog`] or [`DogPatch`].

use crate::error::ApiError;
use crate::model::{DogPatch, NewDog};
use serde_json::{Map, Value};

/// Field names accepted in create and update bodies.
pub const DOG_FIELDS: [&str; 4] = ["name", "description", "breed", "age"];

/// Whether absent fields are violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `name`, `description` and `age` must be present.
    Create,
    /// Everything is optional; present fields are type checked.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
    /// Optional, and JSON `null` is accepted as "no value".
    Nullable,
}

impl Mode {
    fn presence(self) -> Presence {
        match self {
            Mode::Create => Presence::Required,
            Mode::Update => Presence::Optional,
        }
    }
}

/// Validate a create body and normalize it.
///
/// A missing body is treated as an empty object, which reports every required
/// field.
pub fn validate_create(body: Option<&Value>) -> Result<NewDog, Vec<String>> {
    let fields = as_object(body)?;
    let mut errors = Vec::new();
    let checked = check_fields(fields, Mode::Create, &mut errors);

    match checked {
        Checked {
            name: Some(name),
            description: Some(description),
            breed,
            age: Some(age),
        } if errors.is_empty() => Ok(NewDog {
            name,
            description,
            breed: breed.flatten(),
            age,
        }),
        _ => Err(errors),
    }
}

/// Validate a partial update body and normalize it.
pub fn validate_update(body: Option<&Value>) -> Result<DogPatch, Vec<String>> {
    let fields = as_object(body)?;
    let mut errors = Vec::new();
    let checked = check_fields(fields, Mode::Update, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(DogPatch {
        name: checked.name,
        description: checked.description,
        breed: checked.breed,
        age: checked.age,
    })
}

/// Parse the `{id}` path segment.
///
/// Anything that is not a base-10 integer is an [`ApiError::InvalidId`],
/// which is decided before the store is consulted.
pub fn parse_id(raw: Option<&str>) -> Result<i64, ApiError> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(ApiError::InvalidId)
}

struct Checked {
    name: Option<String>,
    description: Option<String>,
    breed: Option<Option<String>>,
    age: Option<f64>,
}

fn check_fields(fields: &Map<String, Value>, mode: Mode, errors: &mut Vec<String>) -> Checked {
    let presence = mode.presence();
    let name = read_text(fields, "name", presence, errors).flatten();
    let description = read_text(fields, "description", presence, errors).flatten();
    let breed = read_text(fields, "breed", Presence::Nullable, errors);
    let age = read_age(fields, presence, errors);

    for key in fields.keys() {
        if !DOG_FIELDS.contains(&key.as_str()) {
            errors.push(format!("'{key}' is not a valid key"));
        }
    }

    Checked {
        name,
        description,
        breed,
        age,
    }
}

fn as_object(body: Option<&Value>) -> Result<&Map<String, Value>, Vec<String>> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match body {
        None => Ok(EMPTY.get_or_init(Map::new)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(vec!["request body should be a JSON object".to_string()]),
    }
}

/// `None` means absent or invalid, `Some(None)` an accepted `null`.
fn read_text(
    fields: &Map<String, Value>,
    key: &str,
    presence: Presence,
    errors: &mut Vec<String>,
) -> Option<Option<String>> {
    match (fields.get(key), presence) {
        (Some(Value::String(s)), _) => Some(Some(s.clone())),
        (Some(Value::Null), Presence::Nullable) => Some(None),
        (None, Presence::Optional | Presence::Nullable) => None,
        _ => {
            errors.push(format!("{key} should be a string"));
            None
        }
    }
}

fn read_age(fields: &Map<String, Value>, presence: Presence, errors: &mut Vec<String>) -> Option<f64> {
    match fields.get("age") {
        None if presence != Presence::Required => None,
        Some(Value::Number(n)) if n.as_f64().is_some() => n.as_f64(),
        _ => {
            errors.push("age should be a number".to_string());
            None
        }
    }
}
