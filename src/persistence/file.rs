use super::{PersistenceError, PersistenceResult};
use crate::absence::{Absence, AbsenceStatus, AbsenceType, AbsenceWindow, HalfDay, Person};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

pub fn save_absences_to_json<P: AsRef<Path>>(
    absences: &[Absence],
    path: P,
) -> PersistenceResult<()> {
    super::validate_absences(absences)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, absences)?;
    Ok(())
}

pub fn load_absences_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Absence>> {
    let file = File::open(path)?;
    let absences: Vec<Absence> = serde_json::from_reader(file)?;
    super::validate_absences(&absences)?;
    Ok(absences)
}

#[derive(Serialize, Deserialize)]
struct AbsenceCsvRecord {
    id: String,
    person_id: String,
    person_name: String,
    type_json: String,
    start: String,
    end: String,
    start_period: String,
    end_period: String,
    days: String,
    count: f64,
    status: String,
    comment: String,
    cancel_reason: String,
    created: String,
    updated: String,
}

impl AbsenceCsvRecord {
    fn from_absence(absence: &Absence) -> PersistenceResult<Self> {
        Ok(Self {
            id: absence.id.to_string(),
            person_id: absence.person.id.clone(),
            person_name: absence.person.name.clone(),
            type_json: serde_json::to_string(&absence.absence_type)?,
            start: format_date(absence.window.start),
            end: format_date(absence.window.end),
            start_period: absence.window.start_period.as_str().to_string(),
            end_period: absence.window.end_period.as_str().to_string(),
            days: join_dates(&absence.window.days),
            count: absence.window.count,
            status: absence.status().as_str().to_string(),
            comment: absence.comment.clone(),
            cancel_reason: absence.cancel_reason.clone().unwrap_or_default(),
            created: absence.created.to_rfc3339(),
            updated: absence.updated.to_rfc3339(),
        })
    }

    fn into_absence(self) -> PersistenceResult<Absence> {
        let id = Uuid::parse_str(self.id.trim())
            .map_err(|err| PersistenceError::InvalidData(format!("invalid id '{}': {err}", self.id)))?;
        let absence_type: AbsenceType = serde_json::from_str(&self.type_json)?;
        let status = AbsenceStatus::from_str(&self.status)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        let window = AbsenceWindow {
            start: parse_date(&self.start)?,
            end: parse_date(&self.end)?,
            start_period: parse_period(&self.start_period)?,
            end_period: parse_period(&self.end_period)?,
            days: split_dates(&self.days)?,
            count: self.count,
        };
        Ok(Absence {
            id,
            person: Person::new(self.person_id, self.person_name),
            absence_type,
            window,
            comment: self.comment,
            confirmed: status == AbsenceStatus::Confirmed,
            canceled: status == AbsenceStatus::Canceled,
            cancel_reason: parse_string_option(self.cancel_reason),
            created: parse_timestamp(&self.created)?,
            updated: parse_timestamp(&self.updated)?,
        })
    }
}

pub fn save_absences_to_csv<P: AsRef<Path>>(
    absences: &[Absence],
    path: P,
) -> PersistenceResult<()> {
    super::validate_absences(absences)?;
    let mut writer = csv::Writer::from_path(path)?;
    for absence in absences {
        writer.serialize(AbsenceCsvRecord::from_absence(absence)?)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_absences_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Absence>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut absences = Vec::new();
    for record in reader.deserialize::<AbsenceCsvRecord>() {
        absences.push(record?.into_absence()?);
    }
    super::validate_absences(&absences)?;
    Ok(absences)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(value: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| PersistenceError::InvalidData(format!("invalid date '{value}': {err}")))
}

fn parse_timestamp(value: &str) -> PersistenceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| PersistenceError::InvalidData(format!("invalid timestamp '{value}': {err}")))
}

fn parse_period(value: &str) -> PersistenceResult<HalfDay> {
    HalfDay::from_str(value).map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

fn join_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| format_date(*d))
        .collect::<Vec<_>>()
        .join(";")
}

fn split_dates(value: &str) -> PersistenceResult<Vec<NaiveDate>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
