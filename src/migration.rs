//! Versioned schema migrations: embedded scripts applied exactly once, in
//! version order, tracked in `schema_history` with a content checksum.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::error::MigrationError;

/// A `major.minor` migration version tag (e.g. `1.0`, `1.1`). Ordered
/// numerically, so `1.10` sorts after `1.2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| MigrationError::BadVersionTag(s.to_string()))?;
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| MigrationError::BadVersionTag(s.to_string()))
        };
        Ok(Version {
            major: parse(major)?,
            minor: parse(minor)?,
        })
    }
}

/// One migration script: version tag, human description, SQL body.
#[derive(Debug)]
pub struct Migration {
    pub version: Version,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All shipped migrations, in version order.
pub static MIGRATIONS: &[Migration] = &[
    Migration {
        version: Version { major: 1, minor: 0 },
        description: "create cities table",
        sql: include_str!("migrations/v1_0_create_cities.sql"),
    },
    Migration {
        version: Version { major: 1, minor: 1 },
        description: "seed cities",
        sql: include_str!("migrations/v1_1_seed_cities.sql"),
    },
];

/// One row of `schema_history`. Written when a script is applied; never
/// mutated or deleted afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: String,
    pub description: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
}

const HISTORY_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_history (
    version TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    checksum TEXT NOT NULL,
    applied_at TEXT NOT NULL
)
"#;

/// SHA-256 hex digest of a script body.
pub fn checksum(sql: &str) -> String {
    format!("{:x}", Sha256::digest(sql.as_bytes()))
}

/// Load the applied-migration history, oldest first.
pub async fn history(pool: &SqlitePool) -> Result<Vec<MigrationRecord>, MigrationError> {
    sqlx::query(HISTORY_DDL).execute(pool).await?;
    let rows: Vec<MigrationRecord> = sqlx::query_as(
        "SELECT version, description, checksum, applied_at FROM schema_history ORDER BY applied_at, version",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Apply every script not yet recorded in `schema_history`, in ascending
/// version order, each inside its own transaction together with its history
/// row. Returns the number of scripts applied.
///
/// Fails fast without applying anything further when a recorded script's
/// checksum no longer matches its body, when a pending script's version is
/// at or below the applied high mark, or when a script errors (the failing
/// script's transaction is rolled back).
pub async fn apply_migrations(
    pool: &SqlitePool,
    migrations: &[Migration],
) -> Result<u32, MigrationError> {
    sqlx::query(HISTORY_DDL).execute(pool).await?;

    let mut seen = HashSet::new();
    for m in migrations {
        if !seen.insert(m.version) {
            return Err(MigrationError::DuplicateVersion(m.version));
        }
    }
    let mut pending: Vec<&Migration> = migrations.iter().collect();
    pending.sort_by_key(|m| m.version);

    let rows: Vec<MigrationRecord> = sqlx::query_as(
        "SELECT version, description, checksum, applied_at FROM schema_history",
    )
    .fetch_all(pool)
    .await?;
    let mut applied: HashMap<Version, MigrationRecord> = HashMap::new();
    for rec in rows {
        let version = rec.version.parse::<Version>()?;
        applied.insert(version, rec);
    }
    let high_mark = applied.keys().copied().max();

    for m in &pending {
        if let Some(rec) = applied.get(&m.version) {
            if rec.checksum != checksum(m.sql) {
                return Err(MigrationError::ChecksumMismatch { version: m.version });
            }
        }
    }

    let mut count = 0;
    for m in pending {
        if applied.contains_key(&m.version) {
            continue;
        }
        if let Some(high) = high_mark {
            if m.version <= high {
                return Err(MigrationError::OutOfOrder {
                    version: m.version,
                    applied: high,
                });
            }
        }

        let mut tx = pool.begin().await?;
        if let Err(e) = sqlx::raw_sql(m.sql).execute(&mut *tx).await {
            tx.rollback().await.ok();
            return Err(MigrationError::ScriptFailed {
                version: m.version,
                source: e,
            });
        }
        sqlx::query(
            "INSERT INTO schema_history (version, description, checksum, applied_at) VALUES (?, ?, ?, ?)",
        )
        .bind(m.version.to_string())
        .bind(m.description)
        .bind(checksum(m.sql))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(version = %m.version, description = m.description, "applied migration");
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_major_minor() {
        let v: Version = "1.0".parse().unwrap();
        assert_eq!(v, Version { major: 1, minor: 0 });
    }

    #[test]
    fn version_rejects_bad_tags() {
        assert!("1".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn version_orders_numerically() {
        let v2: Version = "1.2".parse().unwrap();
        let v10: Version = "1.10".parse().unwrap();
        assert!(v10 > v2);
        assert!("2.0".parse::<Version>().unwrap() > v10);
    }

    #[test]
    fn version_display_round_trips() {
        let v: Version = "3.14".parse().unwrap();
        assert_eq!(v.to_string(), "3.14");
    }

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        assert_eq!(checksum("SELECT 1"), checksum("SELECT 1"));
        assert_ne!(checksum("SELECT 1"), checksum("SELECT 2"));
    }

    #[test]
    fn shipped_migrations_are_ordered_and_unique() {
        let mut prev: Option<Version> = None;
        for m in MIGRATIONS {
            if let Some(p) = prev {
                assert!(m.version > p, "migrations out of order at {}", m.version);
            }
            prev = Some(m.version);
        }
    }
}
