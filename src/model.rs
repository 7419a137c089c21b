//! Dog record types shared by the validator, the stores and the controllers.

use serde::{Deserialize, Serialize, Serializer};

/// A persisted dog record.
///
/// `id` is assigned by the store on creation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub breed: Option<String>,
    /// Any JSON number. Whole values are written back as integers.
    #[serde(serialize_with = "serialize_age")]
    pub age: f64,
}

/// Largest magnitude below which every whole `f64` is an exact integer (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_possible_truncation)]
fn serialize_age<S: Serializer>(age: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if age.fract() == 0.0 && age.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*age as i64)
    } else {
        serializer.serialize_f64(*age)
    }
}

/// Normalized field set for creating a record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDog {
    pub name: String,
    pub description: String,
    pub breed: Option<String>,
    pub age: f64,
}

impl NewDog {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Dog {
        Dog {
            id,
            name: self.name,
            description: self.description,
            breed: self.breed,
            age: self.age,
        }
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// `breed` is doubly optional: `Some(None)` clears the breed, which is how an
/// explicit JSON `null` arrives from the validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DogPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub breed: Option<Option<String>>,
    pub age: Option<f64>,
}

impl DogPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.breed.is_none()
            && self.age.is_none()
    }

    /// Apply the provided fields to `dog`, leaving the rest as they were.
    pub fn apply_to(&self, dog: &mut Dog) {
        if let Some(name) = &self.name {
            dog.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            dog.description.clone_from(description);
        }
        if let Some(breed) = &self.breed {
            dog.breed.clone_from(breed);
        }
        if let Some(age) = self.age {
            dog.age = age;
        }
    }
}

/// Filter for listing records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DogFilter {
    /// Case-sensitive substring that `name` must contain.
    pub name_has: Option<String>,
}

impl DogFilter {
    /// Build a filter from the raw `nameHas` query value. Empty means "no filter".
    #[must_use]
    pub fn name_has(value: Option<&str>) -> Self {
        Self {
            name_has: value.filter(|v| !v.is_empty()).map(str::to_string),
        }
    }

    #[must_use]
    pub fn matches(&self, dog: &Dog) -> bool {
        self.name_has
            .as_deref()
            .is_none_or(|needle| dog.name.contains(needle))
    }
}
