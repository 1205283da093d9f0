//! Synthetic KPI generation for the demo dataset.
//!
//! Fabricates plausible plan/actual figures per branch and period.
//! All figures scale linearly with branch agent headcount and every
//! draw goes through an injected StreamRng, so a fixed master seed
//! reproduces the exact same dashboard.

use crate::{
    directory::Branch,
    period::{
        month_label, resolve_period, round1, trailing_months, KpiBundle, KpiMetric, PeriodData,
        PeriodType,
    },
    rng::StreamRng,
    sample,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Headcount at which a branch generates the baseline figures.
const REFERENCE_HEADCOUNT: f64 = 10.0;
/// Baseline monthly ANP plan (万円) for a reference-sized branch.
const BASE_ANP_PLAN: f64 = 2400.0;
/// Baseline monthly new-contract plan for a reference-sized branch.
const BASE_CONTRACT_PLAN: f64 = 36.0;

/// Fixed product catalog used by the product-mix view.
pub const PRODUCT_CATALOG: [&str; 5] = [
    "終身保険",
    "定期保険",
    "医療保険",
    "がん保険",
    "個人年金保険",
];

/// Acquisition channels used by the contract breakdown.
pub const ACQUISITION_CHANNELS: [&str; 5] = ["訪問", "紹介", "電話", "セミナー", "Web"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: String,
    pub anp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub id: String,
    pub name: String,
    pub anp: f64,
    pub contract_count: u32,
    pub rate: f64,
    /// Six trailing months, chronologically ascending.
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTrendPoint {
    pub month: String,
    pub anp: f64,
    pub contract_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMixEntry {
    pub product: String,
    pub anp: f64,
    pub contract_count: u32,
    pub avg_contract_value: f64,
    pub previous_anp: f64,
    pub trend: Vec<ProductTrendPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractTrendPoint {
    pub month: String,
    pub new_contracts: u32,
    pub cancellations: u32,
    pub net_increase: i64,
    pub cancellation_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub count: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractBreakdown {
    pub new_contracts: u32,
    pub previous_new_contracts: u32,
    pub cancellations: u32,
    pub previous_cancellations: u32,
    pub net_increase: i64,
    pub previous_net_increase: i64,
    pub cancellation_rate: f64,
    pub monthly_trend: Vec<ContractTrendPoint>,
    pub channels: Vec<ChannelShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentEntry {
    pub label: String,
    pub contract_count: u32,
    pub anp: f64,
    pub percentage: u32,
}

/// Three independent partitions of the same contract population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSegments {
    pub total_contracts: u32,
    pub by_age: Vec<SegmentEntry>,
    pub by_gender: Vec<SegmentEntry>,
    pub by_duration: Vec<SegmentEntry>,
}

pub struct SampleGenerator {
    today: NaiveDate,
}

impl SampleGenerator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Plan/actual/rate KPIs for one branch and period.
    pub fn period_data(
        &self,
        branch: &Branch,
        period_type: PeriodType,
        offset: u32,
        rng: &mut StreamRng,
    ) -> PeriodData {
        let scale = branch.agent_count as f64 / REFERENCE_HEADCOUNT;
        let period = resolve_period(period_type, self.today, offset);

        // Period-length multiplier with a planning uplift for longer
        // horizons; achievement variance narrows as the period widens.
        let (length_mult, uplift, band) = match period_type {
            PeriodType::Monthly => (1.0, 1.0, (0.70, 1.20)),
            PeriodType::Quarterly => (3.0, 1.05, (0.75, 1.15)),
            PeriodType::Yearly => (12.0, 1.10, (0.80, 1.10)),
        };

        // Monthly plans oscillate ±15% over the year.
        let seasonal = match period.calendar_month {
            Some((_, month)) => 1.0 + 0.15 * (month as f64 * PI / 6.0).sin(),
            None => 1.0,
        };

        let anp_plan = (BASE_ANP_PLAN * scale * length_mult * uplift * seasonal).round();
        let anp_actual = (anp_plan * rng.uniform(band.0, band.1)).round();

        let contract_plan = (BASE_CONTRACT_PLAN * scale * length_mult * uplift * seasonal).round();
        let contract_actual = (contract_plan * rng.uniform(band.0, band.1)).round();

        let continuation_plan = round1(rng.uniform(95.0, 98.0));
        let continuation_band = match period_type {
            PeriodType::Monthly => (93.0, 99.0),
            PeriodType::Quarterly => (94.0, 98.5),
            PeriodType::Yearly => (94.5, 98.0),
        };
        let continuation_actual = round1(rng.uniform(continuation_band.0, continuation_band.1));

        PeriodData {
            label: period.label,
            period_type,
            metrics: KpiBundle {
                anp: KpiMetric::new(anp_plan, anp_actual),
                contracts: KpiMetric::new(contract_plan, contract_actual),
                continuation: KpiMetric::new(continuation_plan, continuation_actual),
            },
        }
    }

    /// One performance row per agent in the branch.
    pub fn agent_performances(&self, branch: &Branch, rng: &mut StreamRng) -> Vec<AgentPerformance> {
        let months = trailing_months(self.today, 6);
        (0..branch.agent_count)
            .map(|i| {
                let trend = months
                    .iter()
                    .map(|&(y, m)| TrendPoint {
                        month: month_label(y, m),
                        anp: rng.uniform(20.0, 110.0).round(),
                    })
                    .collect();
                AgentPerformance {
                    id: format!("agent-{}-{:02}", branch.code, i + 1),
                    name: sample::full_name(rng),
                    anp: rng.uniform(150.0, 600.0).round(),
                    contract_count: 2 + rng.below(14) as u32,
                    rate: round1(rng.uniform(70.0, 120.0)),
                    trend,
                }
            })
            .collect()
    }

    /// Product mix for the branch's most recent month. Entry ANPs are
    /// apportioned from the branch total, so they sum to it exactly.
    pub fn product_mix(&self, branch: &Branch, rng: &mut StreamRng) -> Vec<ProductMixEntry> {
        let scale = branch.agent_count as f64 / REFERENCE_HEADCOUNT;
        let total_anp = (BASE_ANP_PLAN * scale * rng.uniform(0.80, 1.10)).round();

        let weights: Vec<f64> = PRODUCT_CATALOG.iter().map(|_| rng.uniform(0.5, 1.5)).collect();
        let anp_parts = apportion(total_anp as u64, &weights);

        let months = trailing_months(self.today, 6);
        PRODUCT_CATALOG
            .iter()
            .zip(anp_parts)
            .map(|(product, anp_part)| {
                let anp = anp_part as f64;
                let contract_count = 1 + rng.below(24) as u32;
                let trend = months
                    .iter()
                    .map(|&(y, m)| ProductTrendPoint {
                        month: month_label(y, m),
                        anp: (anp * rng.uniform(0.7, 1.3)).round(),
                        contract_count: 1 + rng.below(24) as u32,
                    })
                    .collect();
                ProductMixEntry {
                    product: (*product).to_string(),
                    anp,
                    contract_count,
                    avg_contract_value: if contract_count > 0 {
                        round1(anp / contract_count as f64)
                    } else {
                        0.0
                    },
                    previous_anp: (anp * rng.uniform(0.85, 1.15)).round(),
                    trend,
                }
            })
            .collect()
    }

    pub fn contract_breakdown(&self, branch: &Branch, rng: &mut StreamRng) -> ContractBreakdown {
        let scale = branch.agent_count as f64 / REFERENCE_HEADCOUNT;
        let draw_new = |rng: &mut StreamRng| {
            (BASE_CONTRACT_PLAN * scale * rng.uniform(0.80, 1.20)).round() as u32
        };
        let draw_cancels =
            |rng: &mut StreamRng, new: u32| (new as f64 * rng.uniform(0.10, 0.30)).round() as u32;

        let new_contracts = draw_new(rng);
        let cancellations = draw_cancels(rng, new_contracts);
        let previous_new_contracts = draw_new(rng);
        let previous_cancellations = draw_cancels(rng, previous_new_contracts);

        let monthly_trend = trailing_months(self.today, 6)
            .into_iter()
            .map(|(y, m)| {
                let n = draw_new(rng);
                let c = draw_cancels(rng, n);
                ContractTrendPoint {
                    month: month_label(y, m),
                    new_contracts: n,
                    cancellations: c,
                    net_increase: n as i64 - c as i64,
                    cancellation_rate: cancellation_rate(n, c),
                }
            })
            .collect();

        let channel_counts: Vec<u32> = {
            let weights: Vec<f64> = ACQUISITION_CHANNELS
                .iter()
                .map(|_| rng.uniform(0.5, 2.0))
                .collect();
            apportion(new_contracts as u64, &weights)
                .into_iter()
                .map(|c| c as u32)
                .collect()
        };
        let channel_pcts = percentages(&channel_counts);
        let channels = ACQUISITION_CHANNELS
            .iter()
            .zip(channel_counts.iter().zip(channel_pcts))
            .map(|(channel, (&count, percentage))| ChannelShare {
                channel: (*channel).to_string(),
                count,
                percentage,
            })
            .collect();

        ContractBreakdown {
            new_contracts,
            previous_new_contracts,
            cancellations,
            previous_cancellations,
            net_increase: new_contracts as i64 - cancellations as i64,
            previous_net_increase: previous_new_contracts as i64 - previous_cancellations as i64,
            cancellation_rate: cancellation_rate(new_contracts, cancellations),
            monthly_trend,
            channels,
        }
    }

    pub fn customer_segments(&self, branch: &Branch, rng: &mut StreamRng) -> CustomerSegments {
        let total_contracts = branch.agent_count * 40 + rng.below(200) as u32;

        let age_labels = ["20代以下", "30代", "40代", "50代", "60代以上"];
        let gender_labels = ["男性", "女性"];
        let duration_labels = ["1年未満", "1〜3年", "3〜5年", "5〜10年", "10年以上"];

        CustomerSegments {
            total_contracts,
            by_age: self.partition(total_contracts, &age_labels, rng),
            by_gender: self.partition(total_contracts, &gender_labels, rng),
            by_duration: self.partition(total_contracts, &duration_labels, rng),
        }
    }

    /// Split `total` contracts into labelled segments. Counts sum to
    /// `total` exactly and percentages sum to exactly 100.
    fn partition(&self, total: u32, labels: &[&str], rng: &mut StreamRng) -> Vec<SegmentEntry> {
        let weights: Vec<f64> = labels.iter().map(|_| rng.uniform(0.5, 1.5)).collect();
        let counts: Vec<u32> = apportion(total as u64, &weights)
            .into_iter()
            .map(|c| c as u32)
            .collect();
        let pcts = percentages(&counts);
        labels
            .iter()
            .zip(counts.iter().zip(pcts))
            .map(|(label, (&count, percentage))| SegmentEntry {
                label: (*label).to_string(),
                contract_count: count,
                anp: (count as f64 * rng.uniform(2.0, 8.0)).round(),
                percentage,
            })
            .collect()
    }
}

fn cancellation_rate(new_contracts: u32, cancellations: u32) -> f64 {
    let denom = new_contracts + cancellations;
    if denom == 0 {
        return 0.0;
    }
    round1(cancellations as f64 / denom as f64 * 100.0)
}

/// Largest-remainder apportionment: distribute `total` units across
/// buckets proportionally to `weights`, summing to `total` exactly.
/// Non-positive weight sums yield all zeros.
pub fn apportion(total: u64, weights: &[f64]) -> Vec<u64> {
    let weight_sum: f64 = weights.iter().sum();
    if weights.is_empty() || weight_sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let exact: Vec<f64> = weights
        .iter()
        .map(|w| total as f64 * w / weight_sum)
        .collect();
    let mut units: Vec<u64> = exact.iter().map(|x| x.floor() as u64).collect();
    let assigned: u64 = units.iter().sum();

    // Hand out the leftover units to the largest remainders.
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &i in order.iter().take((total - assigned) as usize) {
        units[i] += 1;
    }
    units
}

/// Integer percentages proportional to `counts`, summing to exactly
/// 100 — or all zeros when every count is zero.
fn percentages(counts: &[u32]) -> Vec<u32> {
    let weights: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    apportion(100, &weights).into_iter().map(|p| p as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apportion_sums_to_total() {
        let parts = apportion(100, &[1.0, 1.0, 1.0]);
        assert_eq!(parts.iter().sum::<u64>(), 100);
        let parts = apportion(7, &[0.9, 0.05, 0.05]);
        assert_eq!(parts.iter().sum::<u64>(), 7);
    }

    #[test]
    fn apportion_handles_zero_weights() {
        assert_eq!(apportion(100, &[0.0, 0.0]), vec![0, 0]);
        assert_eq!(apportion(100, &[]), Vec::<u64>::new());
    }

    #[test]
    fn percentages_of_empty_population_are_zero() {
        assert_eq!(percentages(&[0, 0, 0]), vec![0, 0, 0]);
    }
}
