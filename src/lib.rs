pub mod absence;
pub mod calendar;
pub mod config;
pub mod conflict;
pub mod duration;
pub mod error;
pub mod expand;
pub mod listing;
pub mod normalizer;
pub mod persistence;
pub mod service;

pub use absence::{
    Absence, AbsenceDraft, AbsenceEdit, AbsenceId, AbsenceRequest, AbsenceStatus, AbsenceType,
    AbsenceWindow, HalfDay, Person,
};
pub use calendar::{HolidayCalendar, WorkCalendar, WorkDayMask};
pub use config::Configuration;
pub use conflict::ConflictPolicy;
pub use error::{AbsenceError, AbsenceResult};
pub use expand::Until;
pub use listing::{AbsenceFilter, AbsencePage, SortOrder};
pub use normalizer::{RequestNormalizer, TypeCatalog};
pub use persistence::{AbsenceStore, AbsenceTransaction, MemoryAbsenceStore, PersistenceError};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteAbsenceStore;
pub use service::{AbsenceOutcome, AbsenceService};
