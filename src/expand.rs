use crate::calendar::{WorkCalendar, WorkDayMask};
use chrono::{Datelike, NaiveDate};

/// How far an absence window extends from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    /// Every qualifying day up to and including this date.
    Date(NaiveDate),
    /// This many qualifying days.
    Count(u32),
}

/// Ordered qualifying days of a window starting at `start`.
pub fn expand(start: NaiveDate, until: Until, work_days: &WorkDayMask) -> Vec<NaiveDate> {
    match until {
        Until::Date(end) => {
            let calendar = WorkCalendar::with_year_range(work_days.clone(), start.year(), end.year());
            days_in_range(&calendar, start, end)
        }
        Until::Count(count) => {
            let mut calendar =
                WorkCalendar::with_year_range(work_days.clone(), start.year(), start.year() + 1);
            next_days(&mut calendar, start, count)
        }
    }
}

/// Get all qualifying days in a date range
fn days_in_range(calendar: &WorkCalendar, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;

    while current <= end {
        if calendar.is_available(current) {
            days.push(current);
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// Collect `count` qualifying days from `start`, skipping non-qualifying ones.
fn next_days(calendar: &mut WorkCalendar, start: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = Some(start);

    while let Some(date) = current {
        if days.len() as u32 >= count {
            break;
        }
        calendar.cover(date);
        if calendar.is_available(date) {
            days.push(date);
        }
        current = date.succ_opt();
    }
    days
}
