use staffing_core::db::open_db_in_memory;
use staffing_core::{
    AllocationLedger, DirectoryRepository, EntityRef, NewPerson, RepoError,
    SqliteAllocationLedger, SqliteDirectoryRepository, ValidationError,
};

#[test]
fn commits_reduce_availability_exactly() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory.create_person_named("Ada", "Developer").unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();

    ledger.commit(person.id, project.id, 30).unwrap();
    ledger.commit(person.id, project.id, 20).unwrap();
    assert_eq!(ledger.availability_of(person.id).unwrap(), 50);

    let err = ledger.commit(person.id, project.id, 51).unwrap_err();
    assert!(matches!(
        err,
        RepoError::CapacityExceeded {
            requested: 51,
            available: 50,
            ..
        }
    ));
    assert_eq!(ledger.availability_of(person.id).unwrap(), 50);

    let last = ledger.commit(person.id, project.id, 50).unwrap();
    assert_eq!(last.effort_percentage, 50);
    assert_eq!(ledger.availability_of(person.id).unwrap(), 0);
    assert_eq!(ledger.count_allocations().unwrap(), 3);
}

#[test]
fn capacity_exceeded_leaves_availability_untouched() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory.create_person_named("Ada", "Developer").unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();
    ledger.commit(person.id, project.id, 70).unwrap();

    let err = ledger.commit(person.id, project.id, 40).unwrap_err();
    assert!(matches!(err, RepoError::CapacityExceeded { .. }));
    assert_eq!(ledger.availability_of(person.id).unwrap(), 30);
    assert_eq!(ledger.allocations_for_person(person.id).unwrap().len(), 1);
}

#[test]
fn effort_outside_range_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory.create_person_named("Ada", "Developer").unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();

    for effort in [0, -10, 101] {
        let err = ledger.commit(person.id, project.id, effort).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::EffortOutOfRange(value)) if value == effort
        ));
    }
    assert_eq!(ledger.count_allocations().unwrap(), 0);
}

#[test]
fn commit_against_unknown_ids_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory.create_person_named("Ada", "Developer").unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();

    let err = ledger.commit(99, project.id, 10).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Person(99))));
    let err = ledger.commit(person.id, 99, 10).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Project(99))));
    let err = ledger.availability_of(99).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityRef::Person(99))));
}

#[test]
fn reduced_base_capacity_caps_availability() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory
        .create_person(&NewPerson::with_capacity("Bo", "Designer", 60))
        .unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();

    assert_eq!(ledger.availability_of(person.id).unwrap(), 60);
    let err = ledger.commit(person.id, project.id, 70).unwrap_err();
    assert!(matches!(
        err,
        RepoError::CapacityExceeded {
            available: 60,
            ..
        }
    ));
    ledger.commit(person.id, project.id, 60).unwrap();
    assert_eq!(ledger.availability_of(person.id).unwrap(), 0);
}

#[test]
fn allocations_are_listed_per_person_and_per_project() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let ada = directory.create_person_named("Ada", "Developer").unwrap();
    let bo = directory.create_person_named("Bo", "Designer").unwrap();
    let apollo = directory.create_project_named("Apollo", None).unwrap();
    let gemini = directory.create_project_named("Gemini", None).unwrap();

    let first = ledger.commit(ada.id, apollo.id, 40).unwrap();
    let second = ledger.commit(bo.id, apollo.id, 60).unwrap();
    let third = ledger.commit(ada.id, gemini.id, 10).unwrap();

    assert_eq!(
        ledger.allocations_for_person(ada.id).unwrap(),
        vec![first, third]
    );
    assert_eq!(
        ledger.allocations_for_project(apollo.id).unwrap(),
        vec![first, second]
    );
    assert!(matches!(
        ledger.allocations_for_project(77).unwrap_err(),
        RepoError::NotFound(EntityRef::Project(77))
    ));
}

#[test]
fn release_frees_effort_and_unknown_release_fails() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory.create_person_named("Ada", "Developer").unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();
    let allocation = ledger.commit(person.id, project.id, 80).unwrap();

    let released = ledger.release(allocation.id).unwrap();
    assert_eq!(released, allocation);
    assert_eq!(ledger.availability_of(person.id).unwrap(), 100);

    let err = ledger.release(allocation.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound(EntityRef::Allocation(id)) if id == allocation.id
    ));
}

#[test]
fn snapshot_covers_every_person_and_stays_in_bounds() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();
    let efforts = [0, 25, 100];
    let mut people = Vec::new();
    for (idx, effort) in efforts.iter().enumerate() {
        let person = directory
            .create_person_named(&format!("P{idx}"), "Developer")
            .unwrap();
        if *effort > 0 {
            ledger.commit(person.id, project.id, *effort).unwrap();
        }
        people.push(person);
    }

    let snapshot = ledger.snapshot().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.get(people[0].id), Some(100));
    assert_eq!(snapshot.get(people[1].id), Some(75));
    assert_eq!(snapshot.get(people[2].id), Some(0));
    assert_eq!(snapshot.fully_booked_count(), 1);
    for person in &people {
        let availability = ledger.availability_of(person.id).unwrap();
        assert!(availability <= person.base_capacity);
    }
}

#[test]
fn corrupted_rows_are_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let ledger = SqliteAllocationLedger::try_new(&conn).unwrap();
    let person = directory.create_person_named("Ada", "Developer").unwrap();
    let project = directory.create_project_named("Apollo", None).unwrap();
    // Bypass the ledger to simulate state written by a faulty tool.
    conn.execute(
        "INSERT INTO allocations (person_id, project_id, effort_percentage) VALUES (?1, ?2, 80), (?1, ?2, 80);",
        [person.id, project.id],
    )
    .unwrap();

    let err = ledger.availability_of(person.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
