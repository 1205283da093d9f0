//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database. Analytics code calls
//! store methods and works on the returned collections — it never
//! executes SQL directly.

use crate::{
    distribution::{TargetSpec, ThemeDistribution, ThemeResponse},
    error::{DeskError, DeskResult},
    themes::{HearingRecord, MajorTheme},
    types::DistributionId,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

pub struct DeskStore {
    conn: Connection,
}

impl DeskStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_foundation.sql"))?;
        log::debug!("store schema migrated");
        Ok(())
    }

    // ── Hearing records ────────────────────────────────────────

    pub fn insert_hearing(&self, record: &HearingRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO hearing_record
               (id, agency_id, major_theme, middle_theme, detail_theme,
                content, staff_name, recorded_on, branch_id, department_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.agency_id,
                record.major.label(),
                record.middle,
                record.detail,
                record.content,
                record.staff_name,
                record.date.format("%Y-%m-%d").to_string(),
                record.branch_id,
                record.department_id,
            ],
        )?;
        Ok(())
    }

    pub fn hearing_records(&self) -> DeskResult<Vec<HearingRecord>> {
        self.hearing_where("1=1", params![])
    }

    pub fn hearing_by_department(&self, department_id: &str) -> DeskResult<Vec<HearingRecord>> {
        self.hearing_where("department_id = ?1", params![department_id])
    }

    pub fn hearing_by_branch(&self, branch_id: &str) -> DeskResult<Vec<HearingRecord>> {
        self.hearing_where("branch_id = ?1", params![branch_id])
    }

    fn hearing_where(
        &self,
        filter: &str,
        args: impl rusqlite::Params,
    ) -> DeskResult<Vec<HearingRecord>> {
        let sql = format!(
            "SELECT id, agency_id, major_theme, middle_theme, detail_theme,
                    content, staff_name, recorded_on, branch_id, department_id
             FROM hearing_record WHERE {filter}
             ORDER BY recorded_on ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(args, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, agency_id, major, middle, detail, content, staff, date, branch, dept)| {
                Ok(HearingRecord {
                    id,
                    agency_id,
                    major: MajorTheme::from(major),
                    middle,
                    detail,
                    content,
                    staff_name: staff,
                    date: parse_date(&date)?,
                    branch_id: branch,
                    department_id: dept,
                })
            })
            .collect()
    }

    // ── Theme distributions ────────────────────────────────────

    /// The persistence write for a headquarters-authored distribution.
    pub fn create_distribution(&self, dist: &ThemeDistribution) -> DeskResult<()> {
        let (target_type, target_ids) = match &dist.target {
            TargetSpec::All => ("all", Vec::new()),
            TargetSpec::Departments(ids) => ("departments", ids.clone()),
            TargetSpec::Branches(ids) => ("branches", ids.clone()),
        };
        self.conn.execute(
            "INSERT INTO theme_distribution
               (id, title, content, major_theme, middle_theme, detail_theme,
                starts_on, ends_on, required, target_type, target_ids, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                dist.id,
                dist.title,
                dist.content,
                dist.major.label(),
                dist.middle,
                dist.detail,
                dist.starts_on.format("%Y-%m-%d").to_string(),
                dist.ends_on.format("%Y-%m-%d").to_string(),
                dist.required as i64,
                target_type,
                serde_json::to_string(&target_ids)?,
                dist.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn distributions(&self) -> DeskResult<Vec<ThemeDistribution>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, major_theme, middle_theme, detail_theme,
                    starts_on, ends_on, required, target_type, target_ids, created_at
             FROM theme_distribution ORDER BY created_at DESC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, String>(9)?,
                    row.get::<_, String>(10)?,
                    row.get::<_, String>(11)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(parse_distribution_row).collect()
    }

    pub fn find_distribution(&self, id: &str) -> DeskResult<Option<ThemeDistribution>> {
        Ok(self
            .distributions()?
            .into_iter()
            .find(|d| d.id == id))
    }

    // ── Theme responses ────────────────────────────────────────

    pub fn insert_response(&self, response: &ThemeResponse) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO theme_response
               (id, distribution_id, agency_id, branch_id, department_id, note, responded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                response.id,
                response.distribution_id,
                response.agency_id,
                response.branch_id,
                response.department_id,
                response.note,
                response.responded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn responses_for(
        &self,
        distribution_id: &DistributionId,
    ) -> DeskResult<Vec<ThemeResponse>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, distribution_id, agency_id, branch_id, department_id, note, responded_at
             FROM theme_response WHERE distribution_id = ?1
             ORDER BY responded_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![distribution_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, dist, agency, branch, dept, note, at)| {
                Ok(ThemeResponse {
                    id,
                    distribution_id: dist,
                    agency_id: agency,
                    branch_id: branch,
                    department_id: dept,
                    note,
                    responded_at: parse_timestamp(&at)?,
                })
            })
            .collect()
    }
}

#[allow(clippy::type_complexity)]
fn parse_distribution_row(
    row: (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        i64,
        String,
        String,
        String,
    ),
) -> DeskResult<ThemeDistribution> {
    let (
        id,
        title,
        content,
        major,
        middle,
        detail,
        starts_on,
        ends_on,
        required,
        target_type,
        target_ids,
        created_at,
    ) = row;

    let ids: Vec<String> = serde_json::from_str(&target_ids)?;
    let target = match target_type.as_str() {
        "all" => TargetSpec::All,
        "departments" => TargetSpec::Departments(ids),
        "branches" => TargetSpec::Branches(ids),
        other => {
            return Err(DeskError::Other(anyhow::anyhow!(
                "unknown target_type in store: {other}"
            )))
        }
    };

    Ok(ThemeDistribution {
        id,
        title,
        content,
        major: MajorTheme::from(major),
        middle,
        detail,
        starts_on: parse_date(&starts_on)?,
        ends_on: parse_date(&ends_on)?,
        required: required != 0,
        target,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn parse_date(s: &str) -> DeskResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DeskError::Other(anyhow::anyhow!("bad date {s:?}: {e}")))
}

fn parse_timestamp(s: &str) -> DeskResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DeskError::Other(anyhow::anyhow!("bad timestamp {s:?}: {e}")))
}
