use crate::absence::{Absence, AbsenceStatus};
use crate::error::AbsenceError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Criteria for listing absences. Empty criteria keep everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceFilter {
    /// Keep absences ending on or after this date.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Keep absences starting on or before this date.
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub type_ids: Vec<String>,
    #[serde(default)]
    pub person_ids: Vec<String>,
    #[serde(default)]
    pub status: Option<AbsenceStatus>,
    #[serde(default)]
    pub order: SortOrder,
}

impl AbsenceFilter {
    pub fn matches(&self, absence: &Absence) -> bool {
        if let Some(start) = self.start {
            if absence.window.end < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if absence.window.start > end {
                return false;
            }
        }
        if !self.type_ids.is_empty() && !self.type_ids.contains(&absence.absence_type.id) {
            return false;
        }
        if !self.person_ids.is_empty() && !self.person_ids.contains(&absence.person.id) {
            return false;
        }
        match self.status {
            Some(status) => absence.status() == status,
            None => true,
        }
    }

    /// Matching absences, sorted by person then start.
    pub fn select(&self, absences: Vec<Absence>) -> Vec<Absence> {
        let mut selected: Vec<Absence> = absences.into_iter().filter(|a| self.matches(a)).collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }

    fn compare(&self, a: &Absence, b: &Absence) -> Ordering {
        let by_start = a
            .window
            .start
            .cmp(&b.window.start)
            .then(a.window.start_period.cmp(&b.window.start_period));
        let by_start = match self.order {
            SortOrder::Asc => by_start,
            SortOrder::Desc => by_start.reverse(),
        };
        a.person
            .name
            .cmp(&b.person.name)
            .then_with(|| a.person.id.cmp(&b.person.id))
            .then(by_start)
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsencePage {
    pub absences: Vec<Absence>,
    pub current: usize,
    pub total: usize,
}

/// Cut a sorted listing into pages of `limit` (default 50). Pages start at 1.
pub fn paginate(
    absences: Vec<Absence>,
    page: usize,
    limit: Option<usize>,
) -> Result<AbsencePage, AbsenceError> {
    let limit = limit.filter(|&l| l > 0).unwrap_or(DEFAULT_PAGE_LIMIT);
    let pages = absences.len().div_ceil(limit).max(1);
    if page < 1 || page > pages {
        return Err(AbsenceError::InvalidPage { page, pages });
    }
    let absences = absences
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();
    Ok(AbsencePage {
        absences,
        current: page,
        total: pages,
    })
}
