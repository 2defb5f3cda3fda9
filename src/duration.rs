use crate::absence::{AbsenceWindow, HalfDay, weighted_count};
use crate::error::AbsenceError;
use chrono::NaiveDate;

/// Reject a requested end before its start, or a same-day afternoon-to-morning span.
///
/// A missing end counts as the same day as the start.
pub fn check_period_order(
    start: NaiveDate,
    end: Option<NaiveDate>,
    start_period: Option<HalfDay>,
    end_period: Option<HalfDay>,
) -> Result<(), AbsenceError> {
    if let Some(end) = end {
        if start > end {
            return Err(AbsenceError::EndBeforeStart);
        }
    }
    let same_day = end.is_none_or(|end| end == start);
    if same_day
        && start_period == Some(HalfDay::Afternoon)
        && end_period == Some(HalfDay::Morning)
    {
        return Err(AbsenceError::EndBeforeStart);
    }
    Ok(())
}

/// Turn expanded days and requested half-days into a normalized window.
///
/// A requested boundary that is not the first (or last) qualifying day loses
/// its half-day period. Periods then default to a morning start and an
/// afternoon end.
pub fn normalize(
    requested_start: NaiveDate,
    requested_end: Option<NaiveDate>,
    start_period: Option<HalfDay>,
    end_period: Option<HalfDay>,
    days: Vec<NaiveDate>,
) -> Result<AbsenceWindow, AbsenceError> {
    let (Some(&start), Some(&end)) = (days.first(), days.last()) else {
        return Err(AbsenceError::NoQualifyingDays);
    };

    let start_period = if start == requested_start {
        start_period
    } else {
        None
    };
    let end_period = if requested_end == Some(end) {
        end_period
    } else {
        None
    };

    let start_period = start_period.unwrap_or(HalfDay::Morning);
    let end_period = end_period.unwrap_or(HalfDay::Afternoon);
    let count = weighted_count(days.len(), start_period, end_period);
    if count <= 0.0 {
        return Err(AbsenceError::NoQualifyingDays);
    }

    Ok(AbsenceWindow {
        start,
        end,
        start_period,
        end_period,
        days,
        count,
    })
}
