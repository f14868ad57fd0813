//! Idempotent aggregate ingestion
//!
//! `ingest_*` checks the natural key at its finest granularity first
//! (`(type, number, year)` for measures, `(member_id, year)` for terms),
//! inserts the parent and every child inside one transaction, and reports
//! [`InsertOutcome::AlreadyExists`] without touching anything when the key
//! is taken. Two workers racing on the same key are arbitrated by the
//! UNIQUE constraint: the loser's `ON CONFLICT DO NOTHING` insert returns
//! no row and the transaction is rolled back.

use std::str::FromStr;

use capitol_common::types::{InsertOutcome, MeasureRecord, MemberRecord};
use capitol_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::schema;

/// SQLite-backed record store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply the schema
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }

    /// An in-memory store, used by tests
    ///
    /// A single connection is required; each connection to `:memory:`
    /// would otherwise get its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================================================================
    // Existence checks
    // ========================================================================

    /// Whether a measure with this natural key has been ingested
    pub async fn measure_exists(&self, measure_type: &str, number: u32, year: u16) -> Result<bool> {
        let row: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM measures WHERE measure_type = ? AND number = ? AND year = ?",
        )
        .bind(measure_type)
        .bind(number as i64)
        .bind(year as i64)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Whether this member has a term row for this year
    ///
    /// Granularity matters: a returning member across years must not be
    /// skipped just because the base row exists.
    pub async fn member_term_exists(&self, member_id: u32, year: u16) -> Result<bool> {
        let row: Option<i64> =
            sqlx::query_scalar("SELECT id FROM member_terms WHERE member_id = ? AND year = ?")
                .bind(member_id as i64)
                .bind(year as i64)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    // ========================================================================
    // Aggregate ingestion
    // ========================================================================

    /// Insert a measure and all of its children as one unit
    pub async fn ingest_measure(&self, record: &MeasureRecord) -> Result<InsertOutcome> {
        if self
            .measure_exists(record.measure_type.as_str(), record.number, record.year)
            .await?
        {
            debug!(key = %format!("{}{}-{}", record.measure_type, record.number, record.year),
                   "measure already ingested");
            return Ok(InsertOutcome::AlreadyExists);
        }

        let mut tx = self.pool.begin().await?;

        let measure_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO measures (
                measure_type, number, year, current_version, description,
                introducer, companion, package, current_referral,
                act_number, governor_message_number, page_url, pdf_url
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (measure_type, number, year) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(record.measure_type.as_str())
        .bind(record.number as i64)
        .bind(record.year as i64)
        .bind(&record.current_version)
        .bind(&record.description)
        .bind(&record.introducer)
        .bind(&record.companion)
        .bind(&record.package)
        .bind(&record.current_referral)
        .bind(record.act_number.map(|n| n as i64))
        .bind(record.governor_message_number.map(|n| n as i64))
        .bind(&record.page_url)
        .bind(&record.pdf_url)
        .fetch_optional(&mut *tx)
        .await?;

        // Lost a race with a concurrent ingester for the same key.
        let Some(measure_id) = measure_id else {
            tx.rollback().await?;
            return Ok(InsertOutcome::AlreadyExists);
        };

        for event in &record.status_events {
            sqlx::query(
                r#"
                INSERT INTO measure_status_events
                    (measure_id, date, chamber, action, conference_report_number)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(measure_id)
            .bind(event.date)
            .bind(&event.chamber)
            .bind(&event.action)
            .bind(&event.conference_report_number)
            .execute(&mut *tx)
            .await?;
        }

        for version in &record.versions {
            sqlx::query(
                r#"
                INSERT INTO measure_versions
                    (measure_id, version_name, version_code, html_url, pdf_url)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(measure_id)
            .bind(&version.version_name)
            .bind(&version.version_code)
            .bind(&version.html_url)
            .bind(&version.pdf_url)
            .execute(&mut *tx)
            .await?;
        }

        for report in &record.committee_reports {
            sqlx::query(
                r#"
                INSERT INTO measure_committee_reports
                    (measure_id, report_name, html_url, pdf_url)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(measure_id)
            .bind(&report.report_name)
            .bind(&report.html_url)
            .bind(&report.pdf_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(InsertOutcome::Inserted)
    }

    /// Insert a member term aggregate, creating the base member row on
    /// first sight
    ///
    /// Additive across years: an existing member gains a new term and its
    /// committee children; an existing `(member_id, year)` term is a no-op.
    pub async fn ingest_member(&self, record: &MemberRecord) -> Result<InsertOutcome> {
        if self.member_term_exists(record.member_id, record.year).await? {
            debug!(member_id = record.member_id, year = record.year,
                   "member term already ingested");
            return Ok(InsertOutcome::AlreadyExists);
        }

        let mut tx = self.pool.begin().await?;

        // Get-or-create the base member row; the term carries the
        // year-specific data.
        sqlx::query(
            r#"
            INSERT INTO members (member_id, name, bio)
            VALUES (?, ?, ?)
            ON CONFLICT (member_id) DO NOTHING
            "#,
        )
        .bind(record.member_id as i64)
        .bind(&record.name)
        .bind(&record.bio)
        .execute(&mut *tx)
        .await?;

        let term = &record.term;
        let term_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO member_terms (
                member_id, year, title, party, district_type, district_number,
                district_description, district_map_url, email, phone,
                photo_url, current_experience, previous_experience
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (member_id, year) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(record.member_id as i64)
        .bind(record.year as i64)
        .bind(&term.title)
        .bind(&term.party)
        .bind(&term.district_type)
        .bind(term.district_number.map(|n| n as i64))
        .bind(&term.district_description)
        .bind(&term.district_map_url)
        .bind(&term.email)
        .bind(&term.phone)
        .bind(&term.photo_url)
        .bind(&term.current_experience)
        .bind(&term.previous_experience)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(term_id) = term_id else {
            tx.rollback().await?;
            return Ok(InsertOutcome::AlreadyExists);
        };

        for committee in &record.committees {
            sqlx::query(
                r#"
                INSERT INTO member_committees (member_term_id, year, committee_name, position)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(term_id)
            .bind(record.year as i64)
            .bind(&committee.committee_name)
            .bind(&committee.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(InsertOutcome::Inserted)
    }

    // ========================================================================
    // Counts
    // ========================================================================

    /// Number of ingested measures
    pub async fn measure_count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM measures")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Number of ingested member base rows
    pub async fn member_count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?)
    }
}
