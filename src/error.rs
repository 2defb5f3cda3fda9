use crate::absence::Absence;
use crate::persistence::PersistenceError;
use thiserror::Error;

/// Reasons an absence request or lifecycle action is rejected.
#[derive(Debug, Error)]
pub enum AbsenceError {
    #[error("invalid data: {0}")]
    Validation(String),
    #[error("no work days in absence")]
    NoQualifyingDays,
    #[error("end date can't be less than start date")]
    EndBeforeStart,
    #[error("invalid page {page} (pages: {pages})")]
    InvalidPage { page: usize, pages: usize },
    #[error("absence type {0} is disabled")]
    DisabledType(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict with {} existing absence(s)", .0.len())]
    Conflict(Vec<Absence>),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl AbsenceError {
    /// Stable numeric code for callers translating errors into responses.
    pub fn code(&self) -> u16 {
        match self {
            AbsenceError::Validation(_) => 4000,
            AbsenceError::NoQualifyingDays => 4001,
            AbsenceError::EndBeforeStart => 4002,
            AbsenceError::InvalidPage { .. } => 4003,
            AbsenceError::DisabledType(_) => 4004,
            AbsenceError::NotFound(_) => 4040,
            AbsenceError::Conflict(_) => 4090,
            AbsenceError::Persistence(_) => 5000,
        }
    }

    /// Absences carried by a conflict rejection.
    pub fn conflicts(&self) -> Option<&[Absence]> {
        match self {
            AbsenceError::Conflict(conflicts) => Some(conflicts),
            _ => None,
        }
    }
}

pub type AbsenceResult<T> = Result<T, AbsenceError>;
