//! Roll-ups of branch KPIs into department and company totals.
//!
//! RULE: volume metrics (ANP, contract count) are summed as raw
//! plan/actual values and the rate is recomputed from the sums.
//! Rates are never averaged — averaging per-branch rates weights
//! small and large branches equally and is wrong.
//!
//! Continuation rate is the one exception: it is already a ratio, so
//! department plan/actual are arithmetic means across branches.

use crate::{
    directory::Directory,
    generator::SampleGenerator,
    period::{achievement_rate, resolve_period, round1, KpiBundle, KpiMetric, PeriodType},
    rng::StreamRng,
    types::{BranchId, DepartmentId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollup {
    pub label: String,
    pub period_type: PeriodType,
    pub branch_count: usize,
    pub metrics: KpiBundle,
}

/// Per-branch row for tabular display: the branch's own KPIs, not an
/// aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSummary {
    pub branch_id: BranchId,
    pub name: String,
    pub department_id: DepartmentId,
    pub agent_count: u32,
    pub metrics: KpiBundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    Achievement,
    Anp,
}

/// Combine branch KPI bundles into one aggregate bundle.
/// Empty input yields all zeros.
pub fn combine(bundles: &[KpiBundle]) -> KpiBundle {
    if bundles.is_empty() {
        return KpiBundle {
            anp: KpiMetric::zero(),
            contracts: KpiMetric::zero(),
            continuation: KpiMetric::zero(),
        };
    }

    let anp_plan: f64 = bundles.iter().map(|b| b.anp.plan).sum();
    let anp_actual: f64 = bundles.iter().map(|b| b.anp.actual).sum();
    let contract_plan: f64 = bundles.iter().map(|b| b.contracts.plan).sum();
    let contract_actual: f64 = bundles.iter().map(|b| b.contracts.actual).sum();

    let n = bundles.len() as f64;
    let cont_plan = round1(bundles.iter().map(|b| b.continuation.plan).sum::<f64>() / n);
    let cont_actual = round1(bundles.iter().map(|b| b.continuation.actual).sum::<f64>() / n);

    KpiBundle {
        anp: KpiMetric::new(anp_plan, anp_actual),
        contracts: KpiMetric::new(contract_plan, contract_actual),
        continuation: KpiMetric {
            plan: cont_plan,
            actual: cont_actual,
            rate: achievement_rate(cont_plan, cont_actual),
        },
    }
}

/// Department-level totals for one period, from generated branch KPIs.
pub fn department_rollup(
    directory: &Directory,
    generator: &SampleGenerator,
    department_id: &str,
    period_type: PeriodType,
    offset: u32,
    rng: &mut StreamRng,
) -> Rollup {
    let branches = directory.branches_of(department_id);
    let bundles: Vec<KpiBundle> = branches
        .iter()
        .map(|b| generator.period_data(b, period_type, offset, rng).metrics)
        .collect();

    Rollup {
        label: resolve_period(period_type, generator.today(), offset).label,
        period_type,
        branch_count: branches.len(),
        metrics: combine(&bundles),
    }
}

/// Company-level totals across every branch in the directory.
pub fn company_rollup(
    directory: &Directory,
    generator: &SampleGenerator,
    period_type: PeriodType,
    offset: u32,
    rng: &mut StreamRng,
) -> Rollup {
    let bundles: Vec<KpiBundle> = directory
        .branches()
        .iter()
        .map(|b| generator.period_data(b, period_type, offset, rng).metrics)
        .collect();

    Rollup {
        label: resolve_period(period_type, generator.today(), offset).label,
        period_type,
        branch_count: directory.branches().len(),
        metrics: combine(&bundles),
    }
}

/// Trailing periods, most recent first at offset 0, chronologically
/// ascending in the returned vec.
pub fn rollup_history(
    directory: &Directory,
    generator: &SampleGenerator,
    department_id: Option<&str>,
    period_type: PeriodType,
    periods: u32,
    rng: &mut StreamRng,
) -> Vec<Rollup> {
    (0..periods)
        .rev()
        .map(|offset| match department_id {
            Some(id) => department_rollup(directory, generator, id, period_type, offset, rng),
            None => company_rollup(directory, generator, period_type, offset, rng),
        })
        .collect()
}

/// Flat per-branch rows for one department (or the whole company).
pub fn branch_summaries(
    directory: &Directory,
    generator: &SampleGenerator,
    department_id: Option<&str>,
    period_type: PeriodType,
    offset: u32,
    rng: &mut StreamRng,
) -> Vec<BranchSummary> {
    let branches: Vec<&crate::directory::Branch> = match department_id {
        Some(id) => directory.branches_of(id),
        None => directory.branches().iter().collect(),
    };

    branches
        .into_iter()
        .map(|branch| BranchSummary {
            branch_id: branch.id.clone(),
            name: branch.name.clone(),
            department_id: branch.department_id.clone(),
            agent_count: branch.agent_count,
            metrics: generator.period_data(branch, period_type, offset, rng).metrics,
        })
        .collect()
}

/// Sort rows descending by the chosen field. The sort is stable, so
/// ties keep their prior order — no special tie-break is applied.
pub fn rank_branches(mut rows: Vec<BranchSummary>, key: RankKey) -> Vec<BranchSummary> {
    rows.sort_by(|a, b| {
        let (x, y) = match key {
            RankKey::Achievement => (a.metrics.anp.rate, b.metrics.anp.rate),
            RankKey::Anp => (a.metrics.anp.actual, b.metrics.anp.actual),
        };
        y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}
