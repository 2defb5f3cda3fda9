use crate::absence::{Absence, AbsenceId, AbsenceType};
use crate::config::Configuration;
use crate::error::AbsenceError;
use crate::listing::AbsenceFilter;
use crate::normalizer::TypeCatalog;
use serde_json::Error as SerdeJsonError;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Reads and writes performed inside one store transaction.
pub trait AbsenceTransaction: TypeCatalog {
    fn get(&self, id: AbsenceId) -> PersistenceResult<Option<Absence>>;

    /// Every stored absence, in no particular order.
    fn all(&self) -> PersistenceResult<Vec<Absence>>;

    /// Non-canceled absences of a person, optionally leaving one out.
    fn find_by_person(
        &self,
        person_id: &str,
        exclude: Option<AbsenceId>,
    ) -> PersistenceResult<Vec<Absence>>;

    fn insert(&mut self, absence: &Absence) -> PersistenceResult<()>;

    fn update(&mut self, absence: &Absence) -> PersistenceResult<()>;

    /// Returns the removed absence, if it existed.
    fn delete(&mut self, id: AbsenceId) -> PersistenceResult<Option<Absence>>;

    fn save_type(&mut self, absence_type: &AbsenceType) -> PersistenceResult<()>;

    fn configuration(&self) -> PersistenceResult<Configuration>;

    fn save_configuration(&mut self, configuration: &Configuration) -> PersistenceResult<()>;

    fn list(&self, filter: &AbsenceFilter) -> PersistenceResult<Vec<Absence>> {
        Ok(filter.select(self.all()?))
    }
}

/// Storage for absences. `transaction` runs its closure atomically: all of
/// its writes are kept when it returns `Ok`, none when it returns `Err`, and
/// concurrent transactions never interleave their read-check-write steps.
pub trait AbsenceStore: Send + Sync {
    fn transaction<R, F>(&self, f: F) -> Result<R, AbsenceError>
    where
        F: FnOnce(&mut dyn AbsenceTransaction) -> Result<R, AbsenceError>;
}

pub fn validate_absences(absences: &[Absence]) -> PersistenceResult<()> {
    let mut seen_ids = HashSet::with_capacity(absences.len());
    for absence in absences {
        if !seen_ids.insert(absence.id) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate absence id {}",
                absence.id
            )));
        }
        absence.window.validate().map_err(|err| {
            PersistenceError::InvalidData(format!("absence {}: {err}", absence.id))
        })?;
        if absence.confirmed && absence.canceled {
            return Err(PersistenceError::InvalidData(format!(
                "absence {} cannot be both confirmed and canceled",
                absence.id
            )));
        }
    }
    Ok(())
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_absences_from_csv, load_absences_from_json, save_absences_to_csv, save_absences_to_json,
};
pub use memory::MemoryAbsenceStore;
