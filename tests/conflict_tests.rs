use chrono::NaiveDate;
use dayoff_engine::conflict::{self, ConflictPolicy};
use dayoff_engine::{
    Absence, AbsenceError, AbsenceRequest, AbsenceType, AbsenceWindow, HalfDay, Person,
    RequestNormalizer,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn window(
    start: NaiveDate,
    end: NaiveDate,
    start_period: Option<HalfDay>,
    end_period: Option<HalfDay>,
) -> AbsenceWindow {
    RequestNormalizer::default()
        .window(start, Some(end), None, start_period, end_period)
        .unwrap()
}

fn absence_for(person_id: &str, window: AbsenceWindow) -> Absence {
    let request = AbsenceRequest::new(Person::new(person_id, person_id), "leave", window.start)
        .until(window.end)
        .with_periods(Some(window.start_period), Some(window.end_period));
    let draft = RequestNormalizer::default()
        .normalize_with_type(request, AbsenceType::new("leave", "Paid leave"))
        .unwrap();
    Absence::from_draft(draft)
}

#[test]
fn shared_day_inside_existing_absence_conflicts() {
    let existing = vec![absence_for("U1", window(d(2019, 10, 14), d(2019, 10, 18), None, None))];
    let candidate = window(d(2019, 10, 15), d(2019, 10, 15), None, None);

    let conflicts = conflict::find_conflicts("U1", &candidate, &existing, None);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, existing[0].id);
}

#[test]
fn following_day_does_not_conflict() {
    // 2019-10-27 is a Sunday, so the existing absence covers the 28th and 29th.
    let existing = vec![absence_for(
        "U1",
        window(d(2019, 10, 27), d(2019, 10, 29), None, Some(HalfDay::Afternoon)),
    )];
    assert_eq!(existing[0].window.days, vec![d(2019, 10, 28), d(2019, 10, 29)]);

    let candidate = window(d(2019, 10, 30), d(2019, 10, 30), None, None);
    assert!(conflict::find_conflicts("U1", &candidate, &existing, None).is_empty());
}

#[test]
fn morning_end_then_afternoon_start_share_a_day() {
    let existing = vec![absence_for(
        "U1",
        window(d(2019, 10, 14), d(2019, 10, 16), None, Some(HalfDay::Morning)),
    )];
    let candidate = window(
        d(2019, 10, 16),
        d(2019, 10, 17),
        Some(HalfDay::Afternoon),
        None,
    );
    assert!(conflict::find_conflicts("U1", &candidate, &existing, None).is_empty());

    let full_day = window(d(2019, 10, 16), d(2019, 10, 17), None, None);
    assert_eq!(
        conflict::find_conflicts("U1", &full_day, &existing, None).len(),
        1
    );
}

#[test]
fn candidate_ending_in_the_morning_before_an_afternoon_start() {
    let existing = vec![absence_for(
        "U1",
        window(d(2019, 10, 16), d(2019, 10, 18), Some(HalfDay::Afternoon), None),
    )];
    let candidate = window(
        d(2019, 10, 14),
        d(2019, 10, 16),
        None,
        Some(HalfDay::Morning),
    );
    assert!(conflict::find_conflicts("U1", &candidate, &existing, None).is_empty());

    let afternoon_end = window(d(2019, 10, 14), d(2019, 10, 16), None, None);
    assert_eq!(
        conflict::find_conflicts("U1", &afternoon_end, &existing, None).len(),
        1
    );
}

#[test]
fn handover_does_not_excuse_other_shared_days() {
    // Existing runs 14..16 morning; candidate starts the 15th, so the 15th is shared outright.
    let existing = vec![absence_for(
        "U1",
        window(d(2019, 10, 14), d(2019, 10, 16), None, Some(HalfDay::Morning)),
    )];
    let candidate = window(
        d(2019, 10, 15),
        d(2019, 10, 17),
        Some(HalfDay::Afternoon),
        None,
    );
    assert_eq!(
        conflict::find_conflicts("U1", &candidate, &existing, None).len(),
        1
    );
}

#[test]
fn each_conflicting_absence_is_reported_once() {
    let existing = vec![
        absence_for("U1", window(d(2019, 10, 14), d(2019, 10, 18), None, None)),
        absence_for("U1", window(d(2019, 10, 21), d(2019, 10, 22), None, None)),
        absence_for("U1", window(d(2019, 11, 4), d(2019, 11, 5), None, None)),
    ];
    let candidate = window(d(2019, 10, 16), d(2019, 10, 21), None, None);

    let conflicts = conflict::find_conflicts("U1", &candidate, &existing, None);
    let ids: Vec<_> = conflicts.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![existing[0].id, existing[1].id]);
}

#[test]
fn canceled_excluded_and_foreign_absences_are_ignored() {
    let mut canceled = absence_for("U1", window(d(2019, 10, 14), d(2019, 10, 18), None, None));
    canceled.cancel(Some("plans changed".into()));
    let itself = absence_for("U1", window(d(2019, 10, 14), d(2019, 10, 15), None, None));
    let colleague = absence_for("U2", window(d(2019, 10, 14), d(2019, 10, 18), None, None));
    let existing = vec![canceled, itself.clone(), colleague];

    let candidate = window(d(2019, 10, 15), d(2019, 10, 16), None, None);
    assert!(conflict::find_conflicts("U1", &candidate, &existing, Some(itself.id)).is_empty());
    assert_eq!(
        conflict::find_conflicts("U1", &candidate, &existing, None).len(),
        1
    );
}

#[test]
fn reject_policy_fails_with_the_conflicts() {
    let existing = vec![absence_for("U1", window(d(2019, 10, 14), d(2019, 10, 18), None, None))];
    let candidate = window(d(2019, 10, 18), d(2019, 10, 21), None, None);

    let err = conflict::resolve_conflicts(ConflictPolicy::Reject, "U1", &candidate, &existing, None)
        .unwrap_err();
    assert_eq!(err.code(), 4090);
    assert!(matches!(err, AbsenceError::Conflict(ref found) if found.len() == 1));

    let reported =
        conflict::resolve_conflicts(ConflictPolicy::ReportOnly, "U1", &candidate, &existing, None)
            .unwrap();
    assert_eq!(reported.len(), 1);

    let clear = window(d(2019, 10, 21), d(2019, 10, 21), None, None);
    assert!(
        conflict::resolve_conflicts(ConflictPolicy::Reject, "U1", &clear, &existing, None)
            .unwrap()
            .is_empty()
    );
}
