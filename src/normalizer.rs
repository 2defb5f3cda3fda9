use crate::absence::{AbsenceDraft, AbsenceRequest, AbsenceType, AbsenceWindow, HalfDay};
use crate::calendar::WorkDayMask;
use crate::duration;
use crate::error::AbsenceError;
use crate::expand::{self, Until};
use crate::persistence::PersistenceResult;
use chrono::NaiveDate;
use tracing::debug;

/// Largest working-day count a request may book: ten years of every day.
pub const MAX_DAYS_COUNT: u32 = 366 * 10;

/// Lookup of absence types by id.
pub trait TypeCatalog {
    fn absence_type(&self, type_id: &str) -> PersistenceResult<Option<AbsenceType>>;
}

impl TypeCatalog for [AbsenceType] {
    fn absence_type(&self, type_id: &str) -> PersistenceResult<Option<AbsenceType>> {
        Ok(self.iter().find(|t| t.id == type_id).cloned())
    }
}

/// Resolve an absence type that exists and is enabled.
pub fn control_type<C>(catalog: &C, type_id: &str) -> Result<AbsenceType, AbsenceError>
where
    C: TypeCatalog + ?Sized,
{
    match catalog.absence_type(type_id)? {
        Some(absence_type) if absence_type.enabled => Ok(absence_type),
        Some(_) => Err(AbsenceError::DisabledType(type_id.to_string())),
        None => Err(AbsenceError::Validation(format!(
            "wrong absence type '{type_id}'"
        ))),
    }
}

/// Turns raw requests into normalized absences for one work-day mask.
#[derive(Debug, Clone, Default)]
pub struct RequestNormalizer {
    work_days: WorkDayMask,
}

impl RequestNormalizer {
    pub fn new(work_days: WorkDayMask) -> Self {
        Self { work_days }
    }

    /// Normalize a request: period check, type check, day expansion, duration.
    pub fn normalize<C>(
        &self,
        request: AbsenceRequest,
        catalog: &C,
    ) -> Result<AbsenceDraft, AbsenceError>
    where
        C: TypeCatalog + ?Sized,
    {
        duration::check_period_order(
            request.start,
            request.end,
            request.start_period,
            request.end_period,
        )?;
        let absence_type = control_type(catalog, &request.type_id)?;
        self.draft(request, absence_type)
    }

    /// Normalize a request keeping an already resolved type snapshot.
    pub fn normalize_with_type(
        &self,
        request: AbsenceRequest,
        absence_type: AbsenceType,
    ) -> Result<AbsenceDraft, AbsenceError> {
        duration::check_period_order(
            request.start,
            request.end,
            request.start_period,
            request.end_period,
        )?;
        self.draft(request, absence_type)
    }

    /// Normalized window for a date span, without any type check.
    pub fn window(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        days_count: Option<u32>,
        start_period: Option<HalfDay>,
        end_period: Option<HalfDay>,
    ) -> Result<AbsenceWindow, AbsenceError> {
        duration::check_period_order(start, end, start_period, end_period)?;
        self.expand_window(start, end, days_count, start_period, end_period)
    }

    fn draft(
        &self,
        request: AbsenceRequest,
        absence_type: AbsenceType,
    ) -> Result<AbsenceDraft, AbsenceError> {
        let window = self.expand_window(
            request.start,
            request.end,
            request.days_count,
            request.start_period,
            request.end_period,
        )?;

        Ok(AbsenceDraft {
            person: request.person,
            absence_type,
            window,
            comment: request.comment.unwrap_or_default(),
        })
    }

    fn expand_window(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        days_count: Option<u32>,
        start_period: Option<HalfDay>,
        end_period: Option<HalfDay>,
    ) -> Result<AbsenceWindow, AbsenceError> {
        let until = match (end, days_count) {
            (Some(end), _) => Until::Date(end),
            (None, Some(count)) if count > MAX_DAYS_COUNT => {
                return Err(AbsenceError::Validation(format!(
                    "days count {count} exceeds the maximum of {MAX_DAYS_COUNT}"
                )));
            }
            (None, Some(count)) if count > 0 => Until::Count(count),
            (None, _) => Until::Count(1),
        };
        let days = expand::expand(start, until, &self.work_days);
        debug!(%start, ?until, qualifying = days.len(), "expanded absence window");
        if let Until::Count(count) = until {
            if days.len() < count as usize {
                return Err(AbsenceError::Validation(format!(
                    "only {} working days remain after {start}",
                    days.len()
                )));
            }
        }
        duration::normalize(start, end, start_period, end_period, days)
    }
}
