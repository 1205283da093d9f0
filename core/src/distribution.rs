//! Support-theme distributions and completion tracking.
//!
//! Completion counts unique responding agencies against the target
//! population's agent headcount. Deduplication by agency identity is
//! the load-bearing invariant here: a raw response-row count would
//! push rates past 100%.

use crate::{
    directory::{Branch, Directory},
    error::{DeskError, DeskResult},
    themes::MajorTheme,
    types::{AgencyId, BranchId, DepartmentId, DistributionId},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Target population of a distribution. The three forms are mutually
/// exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "ids", rename_all = "snake_case")]
pub enum TargetSpec {
    All,
    Departments(Vec<DepartmentId>),
    Branches(Vec<BranchId>),
}

/// A broadcast announcement/survey. Created once by headquarters,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeDistribution {
    pub id: DistributionId,
    pub title: String,
    pub content: String,
    pub major: MajorTheme,
    pub middle: String,
    pub detail: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub required: bool,
    pub target: TargetSpec,
    pub created_at: DateTime<Utc>,
}

impl ThemeDistribution {
    /// Build a new distribution, assigning a fresh id and validating
    /// the date range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        content: String,
        major: MajorTheme,
        middle: String,
        detail: String,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        required: bool,
        target: TargetSpec,
        created_at: DateTime<Utc>,
    ) -> DeskResult<Self> {
        if starts_on > ends_on {
            return Err(DeskError::InvalidDateRange {
                starts_on: starts_on.to_string(),
                ends_on: ends_on.to_string(),
            });
        }
        Ok(Self {
            id: format!("dist-{}", uuid::Uuid::new_v4()),
            title,
            content,
            major,
            middle,
            detail,
            starts_on,
            ends_on,
            required,
            target,
            created_at,
        })
    }
}

/// One agency's response row. The raw store may hold several rows
/// for the same (distribution, agency) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub id: String,
    pub distribution_id: DistributionId,
    pub agency_id: AgencyId,
    pub branch_id: BranchId,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub note: Option<String>,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCompletion {
    pub branch_id: BranchId,
    pub name: String,
    pub responded: u64,
    pub target: u64,
    pub rate: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCompletion {
    pub department_id: DepartmentId,
    pub name: String,
    pub responded: u64,
    pub target: u64,
    pub rate: u64,
    pub branches: Vec<BranchCompletion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    pub distribution_id: DistributionId,
    pub responded: u64,
    pub target: u64,
    pub rate: u64,
    pub departments: Vec<DepartmentCompletion>,
}

fn rate(responded: u64, target: u64) -> u64 {
    if target == 0 {
        return 0;
    }
    (responded as f64 / target as f64 * 100.0).round() as u64
}

/// Completion at three granularities: overall, per department, per
/// branch. Department and overall rates come from summed numerators
/// and denominators, never from averaging branch rates.
pub fn completion(
    distribution: &ThemeDistribution,
    responses: &[ThemeResponse],
    directory: &Directory,
) -> CompletionReport {
    let in_scope: Vec<&Branch> = match &distribution.target {
        TargetSpec::All => directory.branches().iter().collect(),
        TargetSpec::Departments(ids) => ids
            .iter()
            .flat_map(|id| directory.branches_of(id))
            .collect(),
        TargetSpec::Branches(ids) => ids
            .iter()
            .filter_map(|id| directory.find_branch(id))
            .collect(),
    };

    let branch_row = |branch: &Branch| -> BranchCompletion {
        let unique_agencies: HashSet<&str> = responses
            .iter()
            .filter(|r| r.distribution_id == distribution.id && r.branch_id == branch.id)
            .map(|r| r.agency_id.as_str())
            .collect();
        let responded = unique_agencies.len() as u64;
        let target = branch.agent_count as u64;
        BranchCompletion {
            branch_id: branch.id.clone(),
            name: branch.name.clone(),
            responded,
            target,
            rate: rate(responded, target),
        }
    };

    // Group branch rows under their owning department, preserving
    // directory order.
    let mut departments: Vec<DepartmentCompletion> = Vec::new();
    for branch in &in_scope {
        let row = branch_row(branch);
        let (dept_id, dept_name) = match directory.department_of(&branch.id) {
            Some(dept) => (dept.id.clone(), dept.name.clone()),
            None => (branch.department_id.clone(), branch.department_id.clone()),
        };
        match departments.iter_mut().find(|d| d.department_id == dept_id) {
            Some(dept) => dept.branches.push(row),
            None => departments.push(DepartmentCompletion {
                department_id: dept_id,
                name: dept_name,
                responded: 0,
                target: 0,
                rate: 0,
                branches: vec![row],
            }),
        }
    }
    for dept in &mut departments {
        dept.responded = dept.branches.iter().map(|b| b.responded).sum();
        dept.target = dept.branches.iter().map(|b| b.target).sum();
        dept.rate = rate(dept.responded, dept.target);
    }

    let responded = departments.iter().map(|d| d.responded).sum();
    let target = departments.iter().map(|d| d.target).sum();

    CompletionReport {
        distribution_id: distribution.id.clone(),
        responded,
        target,
        rate: rate(responded, target),
        departments,
    }
}
