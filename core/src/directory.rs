//! Organizational reference data — departments, branches, agencies.
//!
//! Immutable after load. Every lookup returns an Option; unknown ids
//! are an expected state the UI renders, never an error.

use crate::types::{AgencyId, BranchId, DepartmentId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentCategory {
    Sales,
    Corporate,
    Financial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub code: String,
    pub name: String,
    pub category: DepartmentCategory,
    #[serde(default)]
    pub region: Option<String>,
    pub branch_ids: Vec<BranchId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub code: String,
    pub name: String,
    pub department_id: DepartmentId,
    pub region: String,
    pub address: String,
    pub phone: String,
    /// Agent headcount. Scale factor for generated metrics and the
    /// denominator for distribution completion rates.
    pub agent_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub id: AgencyId,
    pub name: String,
    pub branch_id: BranchId,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectoryFile {
    departments: Vec<Department>,
    branches: Vec<Branch>,
    agencies: Vec<Agency>,
}

/// Read-only provider of the org hierarchy. Injected wherever
/// reference data is needed so tests can substitute small fixtures.
#[derive(Debug, Clone)]
pub struct Directory {
    departments: Vec<Department>,
    branches: Vec<Branch>,
    agencies: Vec<Agency>,
    branch_index: HashMap<BranchId, usize>,
}

impl Directory {
    pub fn new(
        departments: Vec<Department>,
        branches: Vec<Branch>,
        agencies: Vec<Agency>,
    ) -> anyhow::Result<Self> {
        // Every branch referenced by exactly one department.
        let mut owners: HashMap<&str, u32> = HashMap::new();
        for dept in &departments {
            for branch_id in &dept.branch_ids {
                *owners.entry(branch_id.as_str()).or_insert(0) += 1;
            }
        }
        for (branch_id, count) in &owners {
            if *count > 1 {
                anyhow::bail!("branch {branch_id} is listed in {count} departments");
            }
        }

        let branch_index = branches
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();

        Ok(Self {
            departments,
            branches,
            agencies,
            branch_index,
        })
    }

    /// Load from `data/directory.json` under `data_dir`.
    /// In tests, use Directory::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/directory.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: DirectoryFile = serde_json::from_str(&content)?;
        log::info!(
            "directory loaded: {} departments, {} branches, {} agencies",
            file.departments.len(),
            file.branches.len(),
            file.agencies.len()
        );
        Self::new(file.departments, file.branches, file.agencies)
    }

    // ── Lookups ────────────────────────────────────────────────

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    pub fn find_department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    pub fn find_branch(&self, id: &str) -> Option<&Branch> {
        self.branch_index.get(id).map(|&i| &self.branches[i])
    }

    /// Member branches of a department, in the department's listed order.
    /// Unknown department ids yield an empty vec.
    pub fn branches_of(&self, department_id: &str) -> Vec<&Branch> {
        let Some(dept) = self.find_department(department_id) else {
            return Vec::new();
        };
        dept.branch_ids
            .iter()
            .filter_map(|id| self.find_branch(id))
            .collect()
    }

    /// Inverse lookup: the department owning a branch. Linear scan
    /// over each department's member set — fine at this data scale.
    pub fn department_of(&self, branch_id: &str) -> Option<&Department> {
        self.departments
            .iter()
            .find(|d| d.branch_ids.iter().any(|id| id == branch_id))
    }

    pub fn find_agency(&self, id: &str) -> Option<&Agency> {
        self.agencies.iter().find(|a| a.id == id)
    }

    /// Resolve an agency id to its (branch, department) pair.
    pub fn resolve_agency(&self, agency_id: &str) -> Option<(&Branch, &Department)> {
        let agency = self.find_agency(agency_id)?;
        let branch = self.find_branch(&agency.branch_id)?;
        let department = self.department_of(&branch.id)?;
        Some((branch, department))
    }

    pub fn agencies_of(&self, branch_id: &str) -> Vec<&Agency> {
        self.agencies
            .iter()
            .filter(|a| a.branch_id == branch_id)
            .collect()
    }

    /// Fixture with two sales departments and four branches, for tests.
    pub fn default_test() -> Self {
        let departments = vec![
            Department {
                id: "dept-east".into(),
                code: "D01".into(),
                name: "首都圏営業部".into(),
                category: DepartmentCategory::Sales,
                region: Some("関東".into()),
                branch_ids: vec!["branch-tokyo".into(), "branch-yokohama".into()],
            },
            Department {
                id: "dept-west".into(),
                code: "D02".into(),
                name: "関西営業部".into(),
                category: DepartmentCategory::Sales,
                region: Some("関西".into()),
                branch_ids: vec!["branch-osaka".into(), "branch-kobe".into()],
            },
        ];
        let branches = vec![
            Branch {
                id: "branch-tokyo".into(),
                code: "B001".into(),
                name: "東京支社".into(),
                department_id: "dept-east".into(),
                region: "関東".into(),
                address: "東京都千代田区丸の内1-1-1".into(),
                phone: "03-1234-5678".into(),
                agent_count: 20,
            },
            Branch {
                id: "branch-yokohama".into(),
                code: "B002".into(),
                name: "横浜支社".into(),
                department_id: "dept-east".into(),
                region: "関東".into(),
                address: "神奈川県横浜市西区みなとみらい2-2-2".into(),
                phone: "045-234-5678".into(),
                agent_count: 12,
            },
            Branch {
                id: "branch-osaka".into(),
                code: "B003".into(),
                name: "大阪支社".into(),
                department_id: "dept-west".into(),
                region: "関西".into(),
                address: "大阪府大阪市北区梅田3-3-3".into(),
                phone: "06-345-6789".into(),
                agent_count: 16,
            },
            Branch {
                id: "branch-kobe".into(),
                code: "B004".into(),
                name: "神戸支社".into(),
                department_id: "dept-west".into(),
                region: "関西".into(),
                address: "兵庫県神戸市中央区三宮町4-4-4".into(),
                phone: "078-456-7890".into(),
                agent_count: 8,
            },
        ];
        let agencies = vec![
            Agency {
                id: "agency-001".into(),
                name: "丸の内保険サービス".into(),
                branch_id: "branch-tokyo".into(),
            },
            Agency {
                id: "agency-002".into(),
                name: "東京ライフパートナーズ".into(),
                branch_id: "branch-tokyo".into(),
            },
            Agency {
                id: "agency-003".into(),
                name: "横浜あんしん代理店".into(),
                branch_id: "branch-yokohama".into(),
            },
            Agency {
                id: "agency-004".into(),
                name: "梅田総合保険".into(),
                branch_id: "branch-osaka".into(),
            },
            Agency {
                id: "agency-005".into(),
                name: "神戸保険プラザ".into(),
                branch_id: "branch-kobe".into(),
            },
        ];
        Self::new(departments, branches, agencies).expect("test fixture is valid")
    }
}
