#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use dayoff_engine::{
    Absence, AbsenceError, AbsenceFilter, AbsenceRequest, AbsenceService, AbsenceStatus,
    AbsenceStore, AbsenceType, Configuration, ConflictPolicy, Person, RequestNormalizer,
    SqliteAbsenceStore, WorkDayMask,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn leave(start: NaiveDate, end: NaiveDate) -> AbsenceRequest {
    AbsenceRequest::new(Person::new("U1", "Jeanine"), "leave", start).until(end)
}

fn with_leave_type(store: SqliteAbsenceStore) -> AbsenceService<SqliteAbsenceStore> {
    let service = AbsenceService::new(store);
    service
        .save_type(&AbsenceType::new("leave", "Paid leave"))
        .unwrap();
    service
}

#[test]
fn sqlite_store_round_trip_absences() {
    let file = NamedTempFile::new().unwrap();
    let service = with_leave_type(SqliteAbsenceStore::new(file.path()).unwrap());

    let created = service
        .create(
            leave(d(2019, 10, 30), d(2019, 11, 5)).with_comment("Some test comment"),
            ConflictPolicy::Reject,
        )
        .unwrap()
        .absence;
    service.confirm(created.id, ConflictPolicy::Reject).unwrap();

    drop(service);
    let reopened = AbsenceService::new(SqliteAbsenceStore::new(file.path()).unwrap());
    let loaded = reopened.get(created.id).unwrap();
    assert_eq!(loaded.status(), AbsenceStatus::Confirmed);
    assert_eq!(loaded.window, created.window);
    assert_eq!(loaded.comment, "Some test comment");
    assert_eq!(loaded.window.count, 4.0);
}

#[test]
fn sqlite_store_rejects_conflicts_and_ignores_canceled() {
    let service = with_leave_type(SqliteAbsenceStore::in_memory().unwrap());
    let first = service
        .create(leave(d(2019, 10, 14), d(2019, 10, 18)), ConflictPolicy::Reject)
        .unwrap()
        .absence;

    let err = service
        .create(leave(d(2019, 10, 15), d(2019, 10, 15)), ConflictPolicy::Reject)
        .unwrap_err();
    assert_eq!(err.code(), 4090);

    service.cancel(first.id, Some("rescheduled".into())).unwrap();
    service
        .create(leave(d(2019, 10, 15), d(2019, 10, 15)), ConflictPolicy::Reject)
        .unwrap();

    let canceled = service
        .list(&AbsenceFilter {
            status: Some(AbsenceStatus::Canceled),
            ..AbsenceFilter::default()
        })
        .unwrap();
    assert_eq!(canceled.len(), 1);
    assert_eq!(canceled[0].cancel_reason.as_deref(), Some("rescheduled"));
}

#[test]
fn failed_transaction_rolls_back() {
    let store = SqliteAbsenceStore::in_memory().unwrap();
    let draft = RequestNormalizer::default()
        .normalize_with_type(
            leave(d(2019, 10, 14), d(2019, 10, 15)),
            AbsenceType::new("leave", "Paid leave"),
        )
        .unwrap();
    let absence = Absence::from_draft(draft);

    let result: Result<(), AbsenceError> = store.transaction(|tx| {
        tx.insert(&absence)?;
        Err(AbsenceError::Validation("abort".into()))
    });
    assert!(result.is_err());

    let stored = store.transaction(|tx| Ok(tx.get(absence.id)?)).unwrap();
    assert!(stored.is_none());
}

#[test]
fn configuration_and_types_persist() {
    let file = NamedTempFile::new().unwrap();
    {
        let service = with_leave_type(SqliteAbsenceStore::new(file.path()).unwrap());
        assert_eq!(service.configuration().unwrap(), Configuration::default());

        let mut configuration = Configuration::new(WorkDayMask::new([1, 2, 3, 4]).unwrap());
        configuration.referrer = Some("U0".into());
        service.configure(&configuration).unwrap();
    }

    let service = AbsenceService::new(SqliteAbsenceStore::new(file.path()).unwrap());
    let configuration = service.configuration().unwrap();
    assert_eq!(configuration.referrer.as_deref(), Some("U0"));

    // Friday is no longer a working day.
    let absence = service
        .create(leave(d(2019, 10, 14), d(2019, 10, 18)), ConflictPolicy::Reject)
        .unwrap()
        .absence;
    assert_eq!(absence.window.end, d(2019, 10, 17));
    assert_eq!(absence.window.count, 4.0);
}

#[test]
fn concurrent_connections_create_one_overlapping_absence() {
    let file = NamedTempFile::new().unwrap();
    with_leave_type(SqliteAbsenceStore::new(file.path()).unwrap());

    let services: Vec<_> = (0..4)
        .map(|_| AbsenceService::new(SqliteAbsenceStore::new(file.path()).unwrap()))
        .collect();
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = services
            .iter()
            .map(|service| {
                scope.spawn(move || {
                    service.create(leave(d(2019, 10, 14), d(2019, 10, 18)), ConflictPolicy::Reject)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let stored = services[0].list(&AbsenceFilter::default()).unwrap();
    assert_eq!(stored.len(), 1);
}
