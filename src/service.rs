use crate::absence::{Absence, AbsenceEdit, AbsenceId, AbsenceRequest, AbsenceType, Person};
use crate::config::Configuration;
use crate::conflict::{self, ConflictPolicy};
use crate::error::AbsenceError;
use crate::listing::{self, AbsenceFilter, AbsencePage};
use crate::normalizer::RequestNormalizer;
use crate::persistence::{AbsenceStore, AbsenceTransaction};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A stored absence along with the absences it overlapped.
///
/// Under [`ConflictPolicy::CancelLosers`] the conflicts are returned in
/// their canceled state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceOutcome {
    pub absence: Absence,
    pub conflicts: Vec<Absence>,
}

/// Absence lifecycle on top of a store. Each operation runs inside a single
/// store transaction.
pub struct AbsenceService<S> {
    store: S,
}

impl<S: AbsenceStore> AbsenceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn configuration(&self) -> Result<Configuration, AbsenceError> {
        self.store.transaction(|tx| Ok(tx.configuration()?))
    }

    pub fn configure(&self, configuration: &Configuration) -> Result<(), AbsenceError> {
        self.store
            .transaction(|tx| Ok(tx.save_configuration(configuration)?))
    }

    pub fn save_type(&self, absence_type: &AbsenceType) -> Result<(), AbsenceError> {
        self.store.transaction(|tx| Ok(tx.save_type(absence_type)?))
    }

    pub fn create(
        &self,
        request: AbsenceRequest,
        policy: ConflictPolicy,
    ) -> Result<AbsenceOutcome, AbsenceError> {
        self.store.transaction(|tx| {
            let normalizer = normalizer_for(tx)?;
            let draft = normalizer.normalize(request, &*tx)?;
            let existing = tx.find_by_person(&draft.person.id, None)?;
            let conflicts = conflict::resolve_conflicts(
                policy,
                &draft.person.id,
                &draft.window,
                &existing,
                None,
            )
            .inspect_err(log_rejection)?;

            let absence = Absence::from_draft(draft);
            tx.insert(&absence)?;
            let conflicts = settle_conflicts(tx, conflicts, policy)?;
            info!(id = %absence.id, person = %absence.person.id, "absence created");
            Ok(AbsenceOutcome { absence, conflicts })
        })
    }

    /// Book the same absence for several people at once, without conflict checks.
    pub fn create_for_people(
        &self,
        request: AbsenceRequest,
        people: Vec<Person>,
    ) -> Result<Vec<Absence>, AbsenceError> {
        if people.is_empty() {
            return Err(AbsenceError::Validation(
                "bulk creation requires at least one person".into(),
            ));
        }
        self.store.transaction(|tx| {
            let normalizer = normalizer_for(tx)?;
            let draft = normalizer.normalize(request, &*tx)?;
            let mut created = Vec::with_capacity(people.len());
            for person in people {
                let mut personal = draft.clone();
                personal.person = person;
                let absence = Absence::from_draft(personal);
                tx.insert(&absence)?;
                info!(id = %absence.id, person = %absence.person.id, "absence created");
                created.push(absence);
            }
            Ok(created)
        })
    }

    /// Re-normalize a stored absence with `edit` applied. The absence goes
    /// back to pending.
    pub fn update(
        &self,
        id: AbsenceId,
        edit: AbsenceEdit,
        policy: ConflictPolicy,
    ) -> Result<AbsenceOutcome, AbsenceError> {
        self.store.transaction(|tx| {
            let mut absence = fetch(tx, id)?;
            let normalizer = normalizer_for(tx)?;
            let retyped = edit.type_id.is_some();
            let request = edit.merge_into(&absence);
            let draft = if retyped {
                normalizer.normalize(request, &*tx)?
            } else {
                normalizer.normalize_with_type(request, absence.absence_type.clone())?
            };
            let existing = tx.find_by_person(&draft.person.id, Some(id))?;
            let conflicts = conflict::resolve_conflicts(
                policy,
                &draft.person.id,
                &draft.window,
                &existing,
                Some(id),
            )
            .inspect_err(log_rejection)?;

            absence.apply_draft(draft);
            tx.update(&absence)?;
            let conflicts = settle_conflicts(tx, conflicts, policy)?;
            info!(id = %absence.id, "absence edited");
            Ok(AbsenceOutcome { absence, conflicts })
        })
    }

    /// Confirm an absence, handling the absences it overlaps under `policy`.
    pub fn confirm(
        &self,
        id: AbsenceId,
        policy: ConflictPolicy,
    ) -> Result<AbsenceOutcome, AbsenceError> {
        self.store.transaction(|tx| {
            let mut absence = fetch(tx, id)?;
            let existing = tx.find_by_person(&absence.person.id, Some(id))?;
            let conflicts = conflict::resolve_conflicts(
                policy,
                &absence.person.id,
                &absence.window,
                &existing,
                Some(id),
            )
            .inspect_err(log_rejection)?;
            let conflicts = settle_conflicts(tx, conflicts, policy)?;

            absence.confirm();
            tx.update(&absence)?;
            log_status(&absence);
            Ok(AbsenceOutcome { absence, conflicts })
        })
    }

    pub fn cancel(&self, id: AbsenceId, reason: Option<String>) -> Result<Absence, AbsenceError> {
        self.store.transaction(|tx| {
            let mut absence = fetch(tx, id)?;
            absence.cancel(reason);
            tx.update(&absence)?;
            log_status(&absence);
            Ok(absence)
        })
    }

    pub fn reset(&self, id: AbsenceId) -> Result<Absence, AbsenceError> {
        self.store.transaction(|tx| {
            let mut absence = fetch(tx, id)?;
            absence.reset();
            tx.update(&absence)?;
            log_status(&absence);
            Ok(absence)
        })
    }

    /// Absences currently overlapping a stored absence. Nothing is changed.
    pub fn conflicts(&self, id: AbsenceId) -> Result<Vec<Absence>, AbsenceError> {
        self.store.transaction(|tx| {
            let absence = fetch(tx, id)?;
            let existing = tx.find_by_person(&absence.person.id, Some(id))?;
            Ok(conflict::find_conflicts(
                &absence.person.id,
                &absence.window,
                &existing,
                Some(id),
            ))
        })
    }

    pub fn get(&self, id: AbsenceId) -> Result<Absence, AbsenceError> {
        self.store.transaction(|tx| fetch(tx, id))
    }

    pub fn delete(&self, id: AbsenceId) -> Result<Absence, AbsenceError> {
        self.store.transaction(|tx| {
            let absence = tx
                .delete(id)?
                .ok_or_else(|| AbsenceError::NotFound(format!("absence {id}")))?;
            info!(id = %absence.id, "absence deleted");
            Ok(absence)
        })
    }

    pub fn list(&self, filter: &AbsenceFilter) -> Result<Vec<Absence>, AbsenceError> {
        self.store.transaction(|tx| Ok(tx.list(filter)?))
    }

    pub fn list_page(
        &self,
        filter: &AbsenceFilter,
        page: usize,
        limit: Option<usize>,
    ) -> Result<AbsencePage, AbsenceError> {
        let absences = self.list(filter)?;
        listing::paginate(absences, page, limit)
    }
}

fn normalizer_for(tx: &dyn AbsenceTransaction) -> Result<RequestNormalizer, AbsenceError> {
    Ok(RequestNormalizer::new(tx.configuration()?.work_days))
}

fn fetch(tx: &dyn AbsenceTransaction, id: AbsenceId) -> Result<Absence, AbsenceError> {
    tx.get(id)?
        .ok_or_else(|| AbsenceError::NotFound(format!("absence {id}")))
}

/// Cancel the conflicts when the policy says so.
fn settle_conflicts(
    tx: &mut dyn AbsenceTransaction,
    conflicts: Vec<Absence>,
    policy: ConflictPolicy,
) -> Result<Vec<Absence>, AbsenceError> {
    if policy != ConflictPolicy::CancelLosers {
        return Ok(conflicts);
    }
    let mut canceled = Vec::with_capacity(conflicts.len());
    for mut loser in conflicts {
        loser.cancel(None);
        tx.update(&loser)?;
        warn!(id = %loser.id, person = %loser.person.id, "absence canceled by a conflicting absence");
        canceled.push(loser);
    }
    Ok(canceled)
}

fn log_rejection(err: &AbsenceError) {
    if let Some(conflicts) = err.conflicts() {
        warn!(count = conflicts.len(), "absence rejected for conflicts");
    }
}

fn log_status(absence: &Absence) {
    info!(id = %absence.id, status = %absence.status(), "absence status changed");
}
