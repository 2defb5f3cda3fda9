use crate::error::AbsenceError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type AbsenceId = Uuid;

/// Half of a working day an absence starts or ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HalfDay {
    #[serde(rename = "am", alias = "morning")]
    Morning,
    #[serde(rename = "pm", alias = "afternoon")]
    Afternoon,
}

impl HalfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            HalfDay::Morning => "am",
            HalfDay::Afternoon => "pm",
        }
    }
}

impl fmt::Display for HalfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HalfDay {
    type Err = AbsenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "am" | "morning" => Ok(HalfDay::Morning),
            "pm" | "afternoon" => Ok(HalfDay::Afternoon),
            other => Err(AbsenceError::Validation(format!(
                "invalid half-day period '{other}'"
            ))),
        }
    }
}

/// Snapshot of the person an absence belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceType {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub displayed: bool,
    #[serde(default)]
    pub important: bool,
}

fn default_true() -> bool {
    true
}

impl AbsenceType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            emoji: None,
            enabled: true,
            displayed: true,
            important: false,
        }
    }
}

/// Raw absence request as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRequest {
    pub person: Person,
    pub type_id: String,
    pub start: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    /// Working days to book when no end date is given. Missing or zero means one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<HalfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_period: Option<HalfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AbsenceRequest {
    pub fn new(person: Person, type_id: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            person,
            type_id: type_id.into(),
            start,
            end: None,
            days_count: None,
            start_period: None,
            end_period: None,
            comment: None,
        }
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn for_days(mut self, days_count: u32) -> Self {
        self.days_count = Some(days_count);
        self
    }

    pub fn with_periods(mut self, start: Option<HalfDay>, end: Option<HalfDay>) -> Self {
        self.start_period = start;
        self.end_period = end;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Partial update of a stored absence. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceEdit {
    #[serde(default)]
    pub type_id: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    /// Rebooks by working-day count; drops the stored end unless `end` is also set.
    #[serde(default)]
    pub days_count: Option<u32>,
    #[serde(default)]
    pub start_period: Option<HalfDay>,
    #[serde(default)]
    pub end_period: Option<HalfDay>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl AbsenceEdit {
    /// Rebuild a request from the stored record with this edit applied on top.
    pub fn merge_into(self, stored: &Absence) -> AbsenceRequest {
        let end = match (self.end, self.days_count) {
            (Some(end), _) => Some(end),
            (None, Some(_)) => None,
            (None, None) => Some(stored.window.end),
        };
        AbsenceRequest {
            person: stored.person.clone(),
            type_id: self.type_id.unwrap_or_else(|| stored.absence_type.id.clone()),
            start: self.start.unwrap_or(stored.window.start),
            end,
            days_count: self.days_count,
            start_period: self.start_period.or(Some(stored.window.start_period)),
            end_period: self.end_period.or(Some(stored.window.end_period)),
            comment: self.comment.or_else(|| Some(stored.comment.clone())),
        }
    }
}

/// Normalized span of an absence: qualifying days and weighted duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_period: HalfDay,
    pub end_period: HalfDay,
    pub days: Vec<NaiveDate>,
    pub count: f64,
}

impl AbsenceWindow {
    /// Check the structural invariants of a normalized window.
    pub fn validate(&self) -> Result<(), AbsenceError> {
        let (Some(first), Some(last)) = (self.days.first(), self.days.last()) else {
            return Err(AbsenceError::NoQualifyingDays);
        };
        if !self.days.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(AbsenceError::Validation(
                "absence days must be strictly ascending".into(),
            ));
        }
        if *first != self.start || *last != self.end {
            return Err(AbsenceError::Validation(format!(
                "absence bounds {}..{} do not match its days {first}..{last}",
                self.start, self.end
            )));
        }
        let expected = weighted_count(self.days.len(), self.start_period, self.end_period);
        if (self.count - expected).abs() > f64::EPSILON {
            return Err(AbsenceError::Validation(format!(
                "absence count {} does not match its days (expected {expected})",
                self.count
            )));
        }
        if self.count <= 0.0 {
            return Err(AbsenceError::NoQualifyingDays);
        }
        Ok(())
    }
}

/// Day count less half a day for an afternoon start and for a morning end.
pub fn weighted_count(days: usize, start_period: HalfDay, end_period: HalfDay) -> f64 {
    let mut halves = days as i64 * 2;
    if start_period == HalfDay::Afternoon {
        halves -= 1;
    }
    if end_period == HalfDay::Morning {
        halves -= 1;
    }
    halves as f64 / 2.0
}

/// Normalized absence ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceDraft {
    pub person: Person,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    #[serde(flatten)]
    pub window: AbsenceWindow,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl AbsenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsenceStatus::Pending => "pending",
            AbsenceStatus::Confirmed => "confirmed",
            AbsenceStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for AbsenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbsenceStatus {
    type Err = AbsenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AbsenceStatus::Pending),
            "confirmed" => Ok(AbsenceStatus::Confirmed),
            "canceled" => Ok(AbsenceStatus::Canceled),
            other => Err(AbsenceError::Validation(format!(
                "invalid absence status '{other}'"
            ))),
        }
    }
}

/// Stored absence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub id: AbsenceId,
    pub person: Person,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    #[serde(flatten)]
    pub window: AbsenceWindow,
    #[serde(default)]
    pub comment: String,
    pub confirmed: bool,
    pub canceled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Absence {
    /// New pending absence from a normalized draft.
    pub fn from_draft(draft: AbsenceDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            person: draft.person,
            absence_type: draft.absence_type,
            window: draft.window,
            comment: draft.comment,
            confirmed: false,
            canceled: false,
            cancel_reason: None,
            created: now,
            updated: now,
        }
    }

    /// Replace the dates, type and comment with a re-normalized draft.
    /// Editing always puts the absence back to pending.
    pub fn apply_draft(&mut self, draft: AbsenceDraft) {
        self.absence_type = draft.absence_type;
        self.window = draft.window;
        self.comment = draft.comment;
        self.reset();
    }

    pub fn status(&self) -> AbsenceStatus {
        if self.canceled {
            AbsenceStatus::Canceled
        } else if self.confirmed {
            AbsenceStatus::Confirmed
        } else {
            AbsenceStatus::Pending
        }
    }

    pub fn confirm(&mut self) {
        self.set_flags(true, false, None);
    }

    pub fn cancel(&mut self, reason: Option<String>) {
        let reason = reason.filter(|r| !r.trim().is_empty());
        self.set_flags(false, true, reason);
    }

    pub fn reset(&mut self) {
        self.set_flags(false, false, None);
    }

    fn set_flags(&mut self, confirmed: bool, canceled: bool, cancel_reason: Option<String>) {
        self.confirmed = confirmed;
        self.canceled = canceled;
        self.cancel_reason = cancel_reason;
        self.updated = Utc::now();
    }
}
