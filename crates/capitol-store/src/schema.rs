//! Table definitions
//!
//! Every natural key named in the data model carries a UNIQUE constraint
//! here. Child tables reference their parent row id, so an orphaned child
//! cannot be created, and a duplicate child inside one aggregate aborts
//! the whole ingestion transaction.

use capitol_common::Result;
use sqlx::SqlitePool;

/// DDL applied at startup, in order
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS measures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        measure_type TEXT NOT NULL,
        number INTEGER NOT NULL,
        year INTEGER NOT NULL,
        current_version TEXT,
        description TEXT,
        introducer TEXT,
        companion TEXT,
        package TEXT,
        current_referral TEXT,
        act_number INTEGER,
        governor_message_number INTEGER,
        page_url TEXT,
        pdf_url TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (measure_type, number, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS measure_status_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        measure_id INTEGER NOT NULL REFERENCES measures(id),
        date TEXT NOT NULL,
        chamber TEXT,
        action TEXT NOT NULL,
        conference_report_number TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS measure_versions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        measure_id INTEGER NOT NULL REFERENCES measures(id),
        version_name TEXT NOT NULL,
        version_code TEXT,
        html_url TEXT,
        pdf_url TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (measure_id, version_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS measure_committee_reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        measure_id INTEGER NOT NULL REFERENCES measures(id),
        report_name TEXT NOT NULL,
        html_url TEXT,
        pdf_url TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (measure_id, report_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL UNIQUE,
        name TEXT,
        bio TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS member_terms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL REFERENCES members(member_id),
        year INTEGER NOT NULL,
        title TEXT,
        party TEXT,
        district_type TEXT,
        district_number INTEGER,
        district_description TEXT,
        district_map_url TEXT,
        email TEXT,
        phone TEXT,
        photo_url TEXT,
        current_experience TEXT,
        previous_experience TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (member_id, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS member_committees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_term_id INTEGER NOT NULL REFERENCES member_terms(id),
        year INTEGER NOT NULL,
        committee_name TEXT NOT NULL,
        position TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (member_term_id, committee_name, year)
    )
    "#,
];

/// Create all tables if they do not exist
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
