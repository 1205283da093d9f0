//! Hearing-record classification and theme analytics.
//!
//! All functions are total: an empty record set yields empty (or
//! zero-filled) results, and every percentage division is guarded.

use crate::{
    directory::Directory,
    types::{AgencyId, BranchId, DepartmentId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Taxonomy ─────────────────────────────────────────────────────────────────

/// Major theme of the three-level hearing taxonomy.
///
/// The known categories are enumerated; anything else arriving from
/// the external classification data lands in Other. Middle and detail
/// themes stay free-form strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MajorTheme {
    Product,
    SalesSupport,
    Administration,
    Systems,
    CustomerService,
    Training,
    Other(String),
}

impl MajorTheme {
    pub fn label(&self) -> &str {
        match self {
            Self::Product => "商品について",
            Self::SalesSupport => "営業支援",
            Self::Administration => "事務手続き",
            Self::Systems => "システム",
            Self::CustomerService => "顧客対応",
            Self::Training => "教育・研修",
            Self::Other(label) => label,
        }
    }

    /// The six canonical categories, in display order.
    pub fn known() -> [MajorTheme; 6] {
        [
            Self::Product,
            Self::SalesSupport,
            Self::Administration,
            Self::Systems,
            Self::CustomerService,
            Self::Training,
        ]
    }
}

impl From<String> for MajorTheme {
    fn from(s: String) -> Self {
        match s.as_str() {
            "商品について" => Self::Product,
            "営業支援" => Self::SalesSupport,
            "事務手続き" => Self::Administration,
            "システム" => Self::Systems,
            "顧客対応" => Self::CustomerService,
            "教育・研修" => Self::Training,
            _ => Self::Other(s),
        }
    }
}

impl From<MajorTheme> for String {
    fn from(t: MajorTheme) -> String {
        t.label().to_string()
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

/// One qualitative hearing/feedback record. Created elsewhere in the
/// system; read-only here. Branch and department ids are resolved
/// from the agency before the record reaches this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HearingRecord {
    pub id: String,
    pub agency_id: AgencyId,
    pub major: MajorTheme,
    pub middle: String,
    pub detail: String,
    pub content: String,
    pub staff_name: String,
    pub date: NaiveDate,
    pub branch_id: BranchId,
    pub department_id: DepartmentId,
}

// ── Analytics outputs ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: MajorTheme,
    pub count: u64,
    /// Percentage of the filtered set's total, rounded to integer.
    pub percentage: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopIssue {
    pub major: MajorTheme,
    pub middle: String,
    pub count: u64,
    pub percentage: u64,
    /// Content of the earliest-dated record in the group. Pinned to
    /// the earliest date so the sample does not depend on source
    /// iteration order.
    pub sample: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
    pub percentage: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitThemeTally {
    pub unit_id: String,
    pub name: String,
    /// Occurrences per major theme, in legend order.
    pub counts: Vec<(MajorTheme, u64)>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthBucket {
    pub label: String,
    /// Every known theme key appears in every bucket, zero-filled —
    /// chart legends need a consistent series set.
    pub counts: Vec<(MajorTheme, u64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillDown {
    pub middle: Vec<LabelCount>,
    pub detail: Vec<LabelCount>,
    /// Up to 5 most recent matching records, verbatim.
    pub recent: Vec<HearingRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Department,
    Branch,
}

// ── Operations ───────────────────────────────────────────────────────────────

fn pct(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u64
}

/// Count + percentage per major theme, descending by count.
/// Ties keep first-seen order (stable sort).
pub fn theme_distribution(records: &[HearingRecord]) -> Vec<ThemeCount> {
    let mut groups: Vec<(MajorTheme, u64)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(theme, _)| *theme == record.major) {
            Some((_, count)) => *count += 1,
            None => groups.push((record.major.clone(), 1)),
        }
    }

    let total: u64 = groups.iter().map(|(_, c)| c).sum();
    let mut out: Vec<ThemeCount> = groups
        .into_iter()
        .map(|(theme, count)| ThemeCount {
            theme,
            count,
            percentage: pct(count, total),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Top-N issues across the whole corpus, grouped by (major, middle).
/// Descending by count; ties keep first-seen order; capped at `n`.
pub fn top_issues(records: &[HearingRecord], n: usize) -> Vec<TopIssue> {
    struct Group<'a> {
        major: &'a MajorTheme,
        middle: &'a str,
        count: u64,
        sample: &'a HearingRecord,
    }

    let mut groups: Vec<Group> = Vec::new();
    for record in records {
        match groups
            .iter_mut()
            .find(|g| *g.major == record.major && g.middle == record.middle)
        {
            Some(group) => {
                group.count += 1;
                if record.date < group.sample.date {
                    group.sample = record;
                }
            }
            None => groups.push(Group {
                major: &record.major,
                middle: &record.middle,
                count: 1,
                sample: record,
            }),
        }
    }

    let total: u64 = groups.iter().map(|g| g.count).sum();
    let mut out: Vec<TopIssue> = groups
        .into_iter()
        .map(|g| TopIssue {
            major: g.major.clone(),
            middle: g.middle.to_string(),
            count: g.count,
            percentage: pct(g.count, total),
            sample: g.sample.content.clone(),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out.truncate(n);
    out
}

/// Major-theme tallies per department or branch, every unit included
/// (zero rows stay visible in comparison charts), ranked by total
/// descending.
pub fn unit_comparison(
    records: &[HearingRecord],
    directory: &Directory,
    granularity: Granularity,
) -> Vec<UnitThemeTally> {
    let themes = theme_keys(records);

    let units: Vec<(String, String)> = match granularity {
        Granularity::Department => directory
            .departments()
            .iter()
            .map(|d| (d.id.clone(), d.name.clone()))
            .collect(),
        Granularity::Branch => directory
            .branches()
            .iter()
            .map(|b| (b.id.clone(), b.name.clone()))
            .collect(),
    };

    let mut out: Vec<UnitThemeTally> = units
        .into_iter()
        .map(|(unit_id, name)| {
            let counts: Vec<(MajorTheme, u64)> = themes
                .iter()
                .map(|theme| {
                    let count = records
                        .iter()
                        .filter(|r| {
                            r.major == *theme
                                && match granularity {
                                    Granularity::Department => r.department_id == unit_id,
                                    Granularity::Branch => r.branch_id == unit_id,
                                }
                        })
                        .count() as u64;
                    (theme.clone(), count)
                })
                .collect();
            let total = counts.iter().map(|(_, c)| c).sum();
            UnitThemeTally {
                unit_id,
                name,
                counts,
                total,
            }
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out
}

/// The trailing 6 calendar months ending with the month of
/// `reference_date`. Every bucket carries every known theme key,
/// zero-filled where a theme has no records that month.
pub fn timeline(records: &[HearingRecord], reference_date: NaiveDate) -> Vec<MonthBucket> {
    use chrono::Datelike;

    let themes = theme_keys(records);
    crate::period::trailing_months(reference_date, 6)
        .into_iter()
        .map(|(year, month)| {
            let counts = themes
                .iter()
                .map(|theme| {
                    let count = records
                        .iter()
                        .filter(|r| {
                            r.major == *theme
                                && r.date.year() == year
                                && r.date.month() == month
                        })
                        .count() as u64;
                    (theme.clone(), count)
                })
                .collect();
            MonthBucket {
                label: crate::period::month_label(year, month),
                counts,
            }
        })
        .collect()
}

/// Sub-distributions for a selected major theme (and optionally a
/// selected middle theme), plus the 5 most recent matching records.
pub fn drill_down(
    records: &[HearingRecord],
    major: &MajorTheme,
    middle: Option<&str>,
) -> DrillDown {
    let scoped: Vec<&HearingRecord> = records
        .iter()
        .filter(|r| r.major == *major && middle.map_or(true, |m| r.middle == m))
        .collect();

    let middle_dist = label_distribution(scoped.iter().map(|r| r.middle.as_str()));
    let detail_dist = label_distribution(scoped.iter().map(|r| r.detail.as_str()));

    let mut recent: Vec<HearingRecord> = scoped.iter().map(|r| (*r).clone()).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(5);

    DrillDown {
        middle: middle_dist,
        detail: detail_dist,
        recent,
    }
}

/// Consistent series-key set: the canonical categories first, then
/// any Other themes present in the corpus in first-seen order.
fn theme_keys(records: &[HearingRecord]) -> Vec<MajorTheme> {
    let mut keys: Vec<MajorTheme> = MajorTheme::known().to_vec();
    for record in records {
        if !keys.contains(&record.major) {
            keys.push(record.major.clone());
        }
    }
    keys
}

/// Group-count-sort over free-form labels: count, integer percentage
/// of the scoped total, descending by count, ties stable.
fn label_distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut groups: Vec<(&str, u64)> = Vec::new();
    for label in labels {
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => groups.push((label, 1)),
        }
    }
    let total: u64 = groups.iter().map(|(_, c)| c).sum();
    let mut out: Vec<LabelCount> = groups
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
            percentage: pct(count, total),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
