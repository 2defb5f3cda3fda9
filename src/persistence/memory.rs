use super::{AbsenceStore, AbsenceTransaction, PersistenceError, PersistenceResult};
use crate::absence::{Absence, AbsenceId, AbsenceType};
use crate::config::Configuration;
use crate::error::AbsenceError;
use crate::normalizer::TypeCatalog;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    absences: BTreeMap<AbsenceId, Absence>,
    types: HashMap<String, AbsenceType>,
    configuration: Configuration,
}

/// Process-local store. Transactions are serialized by a mutex and work on a
/// copy of the state that replaces it only on success.
#[derive(Debug, Default)]
pub struct MemoryAbsenceStore {
    state: Mutex<MemoryState>,
}

impl MemoryAbsenceStore {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                configuration,
                ..MemoryState::default()
            }),
        }
    }
}

impl AbsenceStore for MemoryAbsenceStore {
    fn transaction<R, F>(&self, f: F) -> Result<R, AbsenceError>
    where
        F: FnOnce(&mut dyn AbsenceTransaction) -> Result<R, AbsenceError>,
    {
        let mut guard = self.state.lock();
        let mut working = guard.clone();
        let result = f(&mut working)?;
        *guard = working;
        Ok(result)
    }
}

impl TypeCatalog for MemoryState {
    fn absence_type(&self, type_id: &str) -> PersistenceResult<Option<AbsenceType>> {
        Ok(self.types.get(type_id).cloned())
    }
}

impl AbsenceTransaction for MemoryState {
    fn get(&self, id: AbsenceId) -> PersistenceResult<Option<Absence>> {
        Ok(self.absences.get(&id).cloned())
    }

    fn all(&self) -> PersistenceResult<Vec<Absence>> {
        Ok(self.absences.values().cloned().collect())
    }

    fn find_by_person(
        &self,
        person_id: &str,
        exclude: Option<AbsenceId>,
    ) -> PersistenceResult<Vec<Absence>> {
        Ok(self
            .absences
            .values()
            .filter(|a| a.person.id == person_id && !a.canceled && Some(a.id) != exclude)
            .cloned()
            .collect())
    }

    fn insert(&mut self, absence: &Absence) -> PersistenceResult<()> {
        if self.absences.contains_key(&absence.id) {
            return Err(PersistenceError::InvalidData(format!(
                "absence {} already exists",
                absence.id
            )));
        }
        self.absences.insert(absence.id, absence.clone());
        Ok(())
    }

    fn update(&mut self, absence: &Absence) -> PersistenceResult<()> {
        match self.absences.get_mut(&absence.id) {
            Some(stored) => {
                *stored = absence.clone();
                Ok(())
            }
            None => Err(PersistenceError::InvalidData(format!(
                "absence {} is not stored",
                absence.id
            ))),
        }
    }

    fn delete(&mut self, id: AbsenceId) -> PersistenceResult<Option<Absence>> {
        Ok(self.absences.remove(&id))
    }

    fn save_type(&mut self, absence_type: &AbsenceType) -> PersistenceResult<()> {
        self.types
            .insert(absence_type.id.clone(), absence_type.clone());
        Ok(())
    }

    fn configuration(&self) -> PersistenceResult<Configuration> {
        Ok(self.configuration.clone())
    }

    fn save_configuration(&mut self, configuration: &Configuration) -> PersistenceResult<()> {
        self.configuration = configuration.clone();
        Ok(())
    }
}
