use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;
use staffing_core::db::migrations::latest_version;
use staffing_core::db::{open_db, open_db_in_memory, DbError};
use staffing_core::{
    DirectoryRepository, RepoError, SqliteAllocationLedger, SqliteDirectoryRepository,
};

const TABLES: &[&str] = &[
    "skills",
    "people",
    "projects",
    "person_skills",
    "project_skills",
    "allocations",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn reopening_file_database_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffing.db");

    let conn = open_db(&path).unwrap();
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    directory.create_person_named("Ada", "Developer").unwrap();
    drop(directory);
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let directory = SqliteDirectoryRepository::try_new(&conn).unwrap();
    let people = directory.list_people().unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].name, "Ada");
}

#[test]
fn concurrent_first_opens_of_fresh_file_all_succeed() {
    const OPENERS: usize = 4;

    for round in 0..10 {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("fresh-{round}.db"));
        let barrier = Arc::new(Barrier::new(OPENERS));

        let handles: Vec<_> = (0..OPENERS)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    open_db(&path).map(|conn| schema_version(&conn))
                })
            })
            .collect();

        for handle in handles {
            let version = handle.join().unwrap().unwrap();
            assert_eq!(version, latest_version());
        }

        let conn = open_db(&path).unwrap();
        for table in TABLES {
            assert_table_exists(&conn, table);
        }
    }
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let directory_err = SqliteDirectoryRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        directory_err,
        RepoError::Db(DbError::SchemaNotReady {
            actual_version: 0,
            ..
        })
    ));
    let ledger_err = SqliteAllocationLedger::try_new(&conn).err().unwrap();
    assert!(matches!(
        ledger_err,
        RepoError::Db(DbError::SchemaNotReady { .. })
    ));
}

#[test]
fn schema_rejects_out_of_range_effort_written_directly() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO people (name, role) VALUES ('Ada', 'Developer');
         INSERT INTO projects (name) VALUES ('Apollo');",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO allocations (person_id, project_id, effort_percentage) VALUES (1, 1, 150);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
