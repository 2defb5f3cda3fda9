use crate::error::AbsenceError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Fixed-date public holidays as (month, day).
const FIXED_HOLIDAYS: [(u32, u32); 8] = [
    (1, 1),   // New Year's Day
    (5, 1),   // Labour Day
    (5, 8),   // Victory in Europe Day
    (7, 14),  // National Day
    (8, 15),  // Assumption
    (11, 1),  // All Saints' Day
    (11, 11), // Armistice Day
    (12, 25), // Christmas
];

/// Offsets from Easter Sunday. Pentecost Monday (+50) is not observed.
const EASTER_OFFSETS: [u64; 2] = [
    1,  // Easter Monday
    39, // Ascension Thursday
];

/// Weekdays counted as working days, indexed 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WorkDayMask {
    days: BTreeSet<u8>,
}

impl WorkDayMask {
    pub fn new<I>(indices: I) -> Result<Self, AbsenceError>
    where
        I: IntoIterator<Item = u8>,
    {
        let days: BTreeSet<u8> = indices.into_iter().collect();
        if days.is_empty() {
            return Err(AbsenceError::Validation(
                "work day mask requires at least one working day".into(),
            ));
        }
        if let Some(bad) = days.iter().find(|&&idx| idx > 6) {
            return Err(AbsenceError::Validation(format!(
                "work day index {bad} must be between 0 and 6"
            )));
        }
        Ok(Self { days })
    }

    pub fn from_weekdays<I>(weekdays: I) -> Result<Self, AbsenceError>
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self::new(
            weekdays
                .into_iter()
                .map(|wd| wd.num_days_from_sunday() as u8),
        )
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.days.contains(&(weekday.num_days_from_sunday() as u8))
    }

    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.days.iter().copied()
    }
}

impl Default for WorkDayMask {
    /// Monday to Friday
    fn default() -> Self {
        Self {
            days: BTreeSet::from([1, 2, 3, 4, 5]),
        }
    }
}

impl TryFrom<Vec<u8>> for WorkDayMask {
    type Error = AbsenceError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkDayMask> for Vec<u8> {
    fn from(mask: WorkDayMask) -> Self {
        mask.days.into_iter().collect()
    }
}

/// Easter Sunday of the Gregorian calendar for `year` (Gauss/Meeus).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let g = year.rem_euclid(19);
    let c = year.div_euclid(100);
    let h = (c - c.div_euclid(4) - (8 * c + 13).div_euclid(25) + 19 * g + 15).rem_euclid(30);
    let i = h - (h / 28) * (1 - (29 / (h + 1)) * ((21 - g) / 11));
    let j = (year + year.div_euclid(4) + i + 2 - c + c.div_euclid(4)).rem_euclid(7);
    let l = i - j;
    let month = 3 + (l + 40).div_euclid(44);
    let day = l + 28 - 31 * month.div_euclid(4);
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Public holidays observed during `year`.
pub fn holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = FIXED_HOLIDAYS
        .iter()
        .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .collect();
    if let Some(easter) = easter_sunday(year) {
        dates.extend(
            EASTER_OFFSETS
                .iter()
                .filter_map(|&offset| easter.checked_add_days(Days::new(offset))),
        );
    }
    dates
}

/// Public holidays for every year in `years`.
pub fn holidays<I>(years: I) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = i32>,
{
    years.into_iter().flat_map(holidays_for_year).collect()
}

/// Holiday lookup covering a growing set of years.
///
/// Owned by a single computation; nothing is shared between calls.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
    years: BTreeSet<i32>,
}

impl HolidayCalendar {
    pub fn with_year_range(start_year: i32, end_year: i32) -> Self {
        let (start, end) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };

        let mut calendar = Self::default();
        for year in start..=end {
            calendar.ensure_year(year);
        }
        calendar
    }

    /// Add the holidays of `year` unless already covered.
    pub fn ensure_year(&mut self, year: i32) {
        if self.years.insert(year) {
            self.holidays.extend(holidays_for_year(year));
        }
    }

    pub fn covers(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

/// Work-day mask combined with the holidays of the years it covers.
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    work_days: WorkDayMask,
    holidays: HolidayCalendar,
}

impl WorkCalendar {
    pub fn new(work_days: WorkDayMask, holidays: HolidayCalendar) -> Self {
        Self {
            work_days,
            holidays,
        }
    }

    pub fn with_year_range(work_days: WorkDayMask, start_year: i32, end_year: i32) -> Self {
        Self::new(
            work_days,
            HolidayCalendar::with_year_range(start_year, end_year),
        )
    }

    /// Extend holiday coverage to the year of `date`.
    pub fn cover(&mut self, date: NaiveDate) {
        self.holidays.ensure_year(date.year());
    }

    /// Check if a date is a qualifying day: a work day that is not a holiday
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.work_days.contains(date.weekday()) && !self.holidays.is_holiday(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easter_matches_known_dates() {
        let cases = [
            (2018, 4, 1),
            (2019, 4, 21),
            (2020, 4, 12),
            (2024, 3, 31),
            (2025, 4, 20),
            (2038, 4, 25),
        ];
        for (year, month, day) in cases {
            assert_eq!(
                easter_sunday(year),
                NaiveDate::from_ymd_opt(year, month, day),
                "easter {year}"
            );
        }
    }

    #[test]
    fn mask_rejects_out_of_range_and_empty() {
        assert!(WorkDayMask::new([1, 7]).is_err());
        assert!(WorkDayMask::new([]).is_err());
        let mask = WorkDayMask::new([0, 6]).unwrap();
        assert!(mask.contains(Weekday::Sun));
        assert!(mask.contains(Weekday::Sat));
        assert!(!mask.contains(Weekday::Mon));
    }
}
