use crate::absence::{Absence, AbsenceId, AbsenceWindow, HalfDay};
use crate::error::AbsenceError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do when a candidate overlaps existing absences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Fail with the conflicting absences.
    #[default]
    Reject,
    /// Go ahead and hand the conflicts back to the caller.
    ReportOnly,
    /// Go ahead and cancel every conflicting absence.
    CancelLosers,
}

/// Existing absences of `person_id` that overlap `candidate`.
///
/// Canceled absences and `exclude` are ignored. A shared day does not count
/// when one absence ends that morning and the other starts that afternoon.
pub fn find_conflicts(
    person_id: &str,
    candidate: &AbsenceWindow,
    existing: &[Absence],
    exclude: Option<AbsenceId>,
) -> Vec<Absence> {
    let candidate_days: HashSet<_> = candidate.days.iter().copied().collect();

    existing
        .iter()
        .filter(|other| other.person.id == person_id)
        .filter(|other| !other.canceled)
        .filter(|other| Some(other.id) != exclude)
        .filter(|other| {
            other
                .window
                .days
                .iter()
                .filter(|day| candidate_days.contains(day))
                .any(|&day| !is_half_day_handover(candidate, &other.window, day))
        })
        .cloned()
        .collect()
}

/// Fail with [`AbsenceError::Conflict`] when `candidate` overlaps an existing absence.
pub fn enforce_no_conflicts(
    person_id: &str,
    candidate: &AbsenceWindow,
    existing: &[Absence],
    exclude: Option<AbsenceId>,
) -> Result<(), AbsenceError> {
    let conflicts = find_conflicts(person_id, candidate, existing, exclude);
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(AbsenceError::Conflict(conflicts))
    }
}

/// Conflicts of `candidate` under `policy`: `Reject` fails on any conflict,
/// the other policies return them.
pub fn resolve_conflicts(
    policy: ConflictPolicy,
    person_id: &str,
    candidate: &AbsenceWindow,
    existing: &[Absence],
    exclude: Option<AbsenceId>,
) -> Result<Vec<Absence>, AbsenceError> {
    match policy {
        ConflictPolicy::Reject => {
            enforce_no_conflicts(person_id, candidate, existing, exclude)?;
            Ok(Vec::new())
        }
        ConflictPolicy::ReportOnly | ConflictPolicy::CancelLosers => {
            Ok(find_conflicts(person_id, candidate, existing, exclude))
        }
    }
}

fn is_half_day_handover(
    candidate: &AbsenceWindow,
    existing: &AbsenceWindow,
    day: chrono::NaiveDate,
) -> bool {
    let existing_ends_first = day == existing.end
        && day == candidate.start
        && candidate.start_period == HalfDay::Afternoon
        && existing.end_period == HalfDay::Morning;
    let candidate_ends_first = day == existing.start
        && day == candidate.end
        && candidate.end_period == HalfDay::Morning
        && existing.start_period == HalfDay::Afternoon;
    existing_ends_first || candidate_ends_first
}
