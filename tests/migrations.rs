//! Migration runner behavior over an in-memory database.

use gazetteer::migration::{checksum, history};
use gazetteer::{apply_migrations, Migration, MigrationError, Version, MIGRATIONS};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

const fn v(major: u32, minor: u32) -> Version {
    Version { major, minor }
}

async fn table_names(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn shipped_sequence_applies_and_is_idempotent() {
    let pool = memory_pool().await;

    let applied = apply_migrations(&pool, MIGRATIONS).await.unwrap();
    assert_eq!(applied, MIGRATIONS.len() as u32);

    let seeded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cities")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(seeded > 0, "seed migration should insert rows");

    // Second run is a no-op: same schema, same data.
    let reapplied = apply_migrations(&pool, MIGRATIONS).await.unwrap();
    assert_eq!(reapplied, 0);
    let after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cities")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(after, seeded);
}

#[tokio::test]
async fn history_records_version_description_and_checksum() {
    let pool = memory_pool().await;
    apply_migrations(&pool, MIGRATIONS).await.unwrap();

    let records = history(&pool).await.unwrap();
    assert_eq!(records.len(), MIGRATIONS.len());
    for (rec, m) in records.iter().zip(MIGRATIONS) {
        assert_eq!(rec.version, m.version.to_string());
        assert_eq!(rec.description, m.description);
        assert_eq!(rec.checksum, checksum(m.sql));
    }
}

#[tokio::test]
async fn changed_script_body_is_refused() {
    let pool = memory_pool().await;
    let original = [Migration {
        version: v(1, 0),
        description: "create notes",
        sql: "CREATE TABLE notes (id INTEGER PRIMARY KEY)",
    }];
    apply_migrations(&pool, &original).await.unwrap();

    let edited = [Migration {
        version: v(1, 0),
        description: "create notes",
        sql: "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)",
    }];
    let err = apply_migrations(&pool, &edited).await.unwrap_err();
    assert!(matches!(
        err,
        MigrationError::ChecksumMismatch { version } if version == v(1, 0)
    ));
}

#[tokio::test]
async fn new_script_below_high_mark_is_out_of_order() {
    let pool = memory_pool().await;
    let first = [
        Migration {
            version: v(1, 0),
            description: "a",
            sql: "CREATE TABLE a (id INTEGER PRIMARY KEY)",
        },
        Migration {
            version: v(1, 2),
            description: "c",
            sql: "CREATE TABLE c (id INTEGER PRIMARY KEY)",
        },
    ];
    apply_migrations(&pool, &first).await.unwrap();

    let with_straggler = [
        Migration {
            version: v(1, 0),
            description: "a",
            sql: "CREATE TABLE a (id INTEGER PRIMARY KEY)",
        },
        Migration {
            version: v(1, 1),
            description: "b",
            sql: "CREATE TABLE b (id INTEGER PRIMARY KEY)",
        },
        Migration {
            version: v(1, 2),
            description: "c",
            sql: "CREATE TABLE c (id INTEGER PRIMARY KEY)",
        },
    ];
    let err = apply_migrations(&pool, &with_straggler).await.unwrap_err();
    assert!(matches!(
        err,
        MigrationError::OutOfOrder { version, applied }
            if version == v(1, 1) && applied == v(1, 2)
    ));
}

#[tokio::test]
async fn gap_between_versions_is_not_an_error() {
    let pool = memory_pool().await;
    let sparse = [
        Migration {
            version: v(1, 0),
            description: "a",
            sql: "CREATE TABLE a (id INTEGER PRIMARY KEY)",
        },
        Migration {
            version: v(2, 0),
            description: "later",
            sql: "CREATE TABLE later (id INTEGER PRIMARY KEY)",
        },
    ];
    assert_eq!(apply_migrations(&pool, &sparse).await.unwrap(), 2);
}

#[tokio::test]
async fn duplicate_version_is_rejected_up_front() {
    let pool = memory_pool().await;
    let doubled = [
        Migration {
            version: v(1, 0),
            description: "a",
            sql: "CREATE TABLE a (id INTEGER PRIMARY KEY)",
        },
        Migration {
            version: v(1, 0),
            description: "a again",
            sql: "CREATE TABLE b (id INTEGER PRIMARY KEY)",
        },
    ];
    let err = apply_migrations(&pool, &doubled).await.unwrap_err();
    assert!(matches!(err, MigrationError::DuplicateVersion(version) if version == v(1, 0)));
    assert!(table_names(&pool).await.iter().all(|t| t == "schema_history"));
}

#[tokio::test]
async fn failing_script_rolls_back_and_records_nothing() {
    let pool = memory_pool().await;
    let scripts = [
        Migration {
            version: v(1, 0),
            description: "good",
            sql: "CREATE TABLE good (id INTEGER PRIMARY KEY)",
        },
        Migration {
            version: v(1, 1),
            description: "bad",
            sql: "CREATE TABLE partial (id INTEGER PRIMARY KEY); INSERT INTO no_such_table VALUES (1);",
        },
    ];
    let err = apply_migrations(&pool, &scripts).await.unwrap_err();
    assert!(matches!(err, MigrationError::ScriptFailed { version, .. } if version == v(1, 1)));

    // The good script committed; the bad one left neither schema nor history.
    let tables = table_names(&pool).await;
    assert!(tables.contains(&"good".to_string()));
    assert!(!tables.contains(&"partial".to_string()));
    let records = history(&pool).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].version, "1.0");
}
