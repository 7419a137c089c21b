use super::{DogStore, StoreError};
use crate::model::{Dog, DogFilter, DogPatch, NewDog};
use may::sync::{Mutex, MutexGuard};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dogs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    description TEXT    NOT NULL,
    breed       TEXT,
    age         REAL    NOT NULL
);";

const SELECT_DOG: &str = "SELECT id, name, description, breed, age FROM dogs";

/// `SQLite` backed store.
///
/// A single connection is shared behind a coroutine-aware mutex; every
/// operation is one statement or one short transaction, so requests never hold
/// the lock across I/O they do not own.
pub struct SqliteDogStore {
    conn: Mutex<Connection>,
}

impl SqliteDogStore {
    /// Open (or create) the database at `path` and ensure the `dogs` table exists.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened SQLite dog store");
        Self::from_connection(conn, busy_timeout)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, Duration::from_millis(0))
    }

    fn from_connection(conn: Connection, busy_timeout: Duration) -> Result<Self, StoreError> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))
    }
}

fn map_dog(row: &Row<'_>) -> rusqlite::Result<Dog> {
    Ok(Dog {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        breed: row.get(3)?,
        age: row.get(4)?,
    })
}

fn select_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Dog>> {
    conn.query_row(&format!("{SELECT_DOG} WHERE id = ?1"), params![id], map_dog)
        .optional()
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::ConstraintViolated(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

impl DogStore for SqliteDogStore {
    fn find_many(&self, filter: &DogFilter) -> Result<Vec<Dog>, StoreError> {
        let conn = self.lock()?;
        let dogs = match &filter.name_has {
            // instr() is a byte-wise, case-sensitive substring test.
            Some(needle) => conn
                .prepare(&format!("{SELECT_DOG} WHERE instr(name, ?1) > 0 ORDER BY id"))?
                .query_map(params![needle], map_dog)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => conn
                .prepare(&format!("{SELECT_DOG} ORDER BY id"))?
                .query_map([], map_dog)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        debug!(count = dogs.len(), name_has = ?filter.name_has, "Listed dogs");
        Ok(dogs)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Dog>, StoreError> {
        let conn = self.lock()?;
        Ok(select_by_id(&conn, id)?)
    }

    fn create(&self, dog: NewDog) -> Result<Dog, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO dogs (name, description, breed, age) VALUES (?1, ?2, ?3, ?4)",
            params![dog.name, dog.description, dog.breed, dog.age],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, "Inserted dog");
        Ok(dog.with_id(id))
    }

    fn update(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(mut dog) = select_by_id(&tx, id)? else {
            return Ok(None);
        };
        patch.apply_to(&mut dog);
        tx.execute(
            "UPDATE dogs SET name = ?1, description = ?2, breed = ?3, age = ?4 WHERE id = ?5",
            params![dog.name, dog.description, dog.breed, dog.age, id],
        )?;
        tx.commit()?;
        Ok(Some(dog))
    }

    fn delete(&self, id: i64) -> Result<Option<Dog>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(dog) = select_by_id(&tx, id)? else {
            return Ok(None);
        };
        tx.execute("DELETE FROM dogs WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(Some(dog))
    }
}
