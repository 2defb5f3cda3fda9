use super::{AbsenceStore, AbsenceTransaction, PersistenceError, PersistenceResult};
use crate::absence::{Absence, AbsenceId, AbsenceType};
use crate::config::Configuration;
use crate::error::AbsenceError;
use crate::normalizer::TypeCatalog;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use std::time::Duration;

/// How long a transaction waits for another writer before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store. Each transaction starts with `BEGIN IMMEDIATE`, so
/// the write lock is held from the first read, across connections and
/// processes sharing the database file.
pub struct SqliteAbsenceStore {
    connection: Mutex<Connection>,
}

impl SqliteAbsenceStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        connection.busy_timeout(BUSY_TIMEOUT)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS configuration (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                configuration_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS absence_types (
                id TEXT PRIMARY KEY,
                type_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS absences (
                id TEXT PRIMARY KEY,
                person_id TEXT NOT NULL,
                canceled INTEGER NOT NULL,
                absence_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS absences_person ON absences (person_id, canceled);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl AbsenceStore for SqliteAbsenceStore {
    fn transaction<R, F>(&self, f: F) -> Result<R, AbsenceError>
    where
        F: FnOnce(&mut dyn AbsenceTransaction) -> Result<R, AbsenceError>,
    {
        let mut conn = self.connection.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(PersistenceError::from)?;
        let mut view = SqliteTransaction { tx };
        // Dropping the view on error rolls the transaction back.
        let result = f(&mut view)?;
        view.tx.commit().map_err(PersistenceError::from)?;
        Ok(result)
    }
}

struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl SqliteTransaction<'_> {
    fn query_absences(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> PersistenceResult<Vec<Absence>> {
        let mut stmt = self.tx.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

        let mut absences = Vec::new();
        for json in rows {
            let json = json?;
            absences.push(serde_json::from_str(&json)?);
        }
        Ok(absences)
    }
}

impl TypeCatalog for SqliteTransaction<'_> {
    fn absence_type(&self, type_id: &str) -> PersistenceResult<Option<AbsenceType>> {
        let json: Option<String> = self
            .tx
            .query_row(
                "SELECT type_json FROM absence_types WHERE id = ?1",
                params![type_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl AbsenceTransaction for SqliteTransaction<'_> {
    fn get(&self, id: AbsenceId) -> PersistenceResult<Option<Absence>> {
        let mut found = self.query_absences(
            "SELECT absence_json FROM absences WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(found.pop())
    }

    fn all(&self) -> PersistenceResult<Vec<Absence>> {
        self.query_absences(
            "SELECT absence_json FROM absences ORDER BY id ASC",
            params![],
        )
    }

    fn find_by_person(
        &self,
        person_id: &str,
        exclude: Option<AbsenceId>,
    ) -> PersistenceResult<Vec<Absence>> {
        let absences = self.query_absences(
            "SELECT absence_json FROM absences WHERE person_id = ?1 AND canceled = 0 ORDER BY id ASC",
            params![person_id],
        )?;
        Ok(absences
            .into_iter()
            .filter(|a| Some(a.id) != exclude)
            .collect())
    }

    fn insert(&mut self, absence: &Absence) -> PersistenceResult<()> {
        let json = serde_json::to_string(absence)?;
        self.tx.execute(
            "INSERT INTO absences (id, person_id, canceled, absence_json) VALUES (?1, ?2, ?3, ?4)",
            params![absence.id.to_string(), absence.person.id, absence.canceled, json],
        )?;
        Ok(())
    }

    fn update(&mut self, absence: &Absence) -> PersistenceResult<()> {
        let json = serde_json::to_string(absence)?;
        let changed = self.tx.execute(
            "UPDATE absences SET person_id = ?2, canceled = ?3, absence_json = ?4 WHERE id = ?1",
            params![absence.id.to_string(), absence.person.id, absence.canceled, json],
        )?;
        if changed == 0 {
            return Err(PersistenceError::InvalidData(format!(
                "absence {} is not stored",
                absence.id
            )));
        }
        Ok(())
    }

    fn delete(&mut self, id: AbsenceId) -> PersistenceResult<Option<Absence>> {
        let existing = self.get(id)?;
        if existing.is_some() {
            self.tx
                .execute("DELETE FROM absences WHERE id = ?1", params![id.to_string()])?;
        }
        Ok(existing)
    }

    fn save_type(&mut self, absence_type: &AbsenceType) -> PersistenceResult<()> {
        let json = serde_json::to_string(absence_type)?;
        self.tx.execute(
            "INSERT INTO absence_types (id, type_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET type_json = excluded.type_json",
            params![absence_type.id, json],
        )?;
        Ok(())
    }

    fn configuration(&self) -> PersistenceResult<Configuration> {
        let json: Option<String> = self
            .tx
            .query_row(
                "SELECT configuration_json FROM configuration WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Configuration::default()),
        }
    }

    fn save_configuration(&mut self, configuration: &Configuration) -> PersistenceResult<()> {
        let json = serde_json::to_string(configuration)?;
        self.tx.execute(
            "INSERT INTO configuration (id, configuration_json) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET configuration_json = excluded.configuration_json",
            params![json],
        )?;
        Ok(())
    }
}
