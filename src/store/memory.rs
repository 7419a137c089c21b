use super::{DogStore, StoreError};
use crate::model::{Dog, DogFilter, DogPatch, NewDog};
use may::sync::{Mutex, MutexGuard};
use std::collections::BTreeMap;

/// In-process store used as a test double and by `serve --memory`.
///
/// Ids start at 1 and are never reused, matching an autoincrement column.
pub struct MemoryDogStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    last_id: i64,
    dogs: BTreeMap<i64, Dog>,
}

impl MemoryDogStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryDogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DogStore for MemoryDogStore {
    fn find_many(&self, filter: &DogFilter) -> Result<Vec<Dog>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .dogs
            .values()
            .filter(|dog| filter.matches(dog))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Dog>, StoreError> {
        Ok(self.lock()?.dogs.get(&id).cloned())
    }

    fn create(&self, dog: NewDog) -> Result<Dog, StoreError> {
        let mut state = self.lock()?;
        state.last_id += 1;
        let dog = dog.with_id(state.last_id);
        state.dogs.insert(dog.id, dog.clone());
        Ok(dog)
    }

    fn update(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>, StoreError> {
        let mut state = self.lock()?;
        Ok(state.dogs.get_mut(&id).map(|dog| {
            patch.apply_to(dog);
            dog.clone()
        }))
    }

    fn delete(&self, id: i64) -> Result<Option<Dog>, StoreError> {
        Ok(self.lock()?.dogs.remove(&id))
    }
}
