use agencydesk_core::{
    directory::{Branch, Directory},
    generator::SampleGenerator,
    period::PeriodType,
    rng::{RngBank, StreamSlot},
};
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn branch(agent_count: u32) -> Branch {
    Branch {
        id: format!("branch-x{agent_count}"),
        code: format!("BX{agent_count}"),
        name: "テスト支社".into(),
        department_id: "dept-east".into(),
        region: "関東".into(),
        address: "-".into(),
        phone: "-".into(),
        agent_count,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Achievement rate must always match its own plan/actual pair.
#[test]
fn rates_are_self_consistent() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(11).for_stream(StreamSlot::Metrics);
    let b = branch(14);

    for period_type in [PeriodType::Monthly, PeriodType::Quarterly, PeriodType::Yearly] {
        for offset in 0..6 {
            let data = generator.period_data(&b, period_type, offset, &mut rng);
            let m = data.metrics.anp;
            let expected = (m.actual / m.plan * 1000.0).round() / 10.0;
            assert_eq!(m.rate, expected, "{period_type:?} offset {offset}");
        }
    }
}

/// Achievement variance narrows as the period widens.
#[test]
fn actuals_stay_inside_the_period_band() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(5).for_stream(StreamSlot::Metrics);
    let b = branch(10);

    let cases = [
        (PeriodType::Monthly, 0.70, 1.20),
        (PeriodType::Quarterly, 0.75, 1.15),
        (PeriodType::Yearly, 0.80, 1.10),
    ];
    for (period_type, lo, hi) in cases {
        for offset in 0..24 {
            let data = generator.period_data(&b, period_type, offset, &mut rng);
            let m = data.metrics.anp;
            let factor = m.actual / m.plan;
            // Rounding to whole figures widens the ratio slightly.
            assert!(
                factor > lo - 0.01 && factor < hi + 0.01,
                "{period_type:?}: factor {factor} outside [{lo}, {hi}]"
            );
            let c = data.metrics.continuation;
            assert!((95.0..=98.0).contains(&c.plan), "continuation plan {}", c.plan);
        }
    }
}

/// Plans are linear in agent headcount: a 20-agent branch plans
/// exactly twice what a 10-agent branch does for the same period.
#[test]
fn plans_scale_with_headcount() {
    let generator = SampleGenerator::new(today());
    let bank = RngBank::new(3);

    let mut rng = bank.for_stream(StreamSlot::Metrics);
    let small = generator.period_data(&branch(10), PeriodType::Monthly, 0, &mut rng);
    let mut rng = bank.for_stream(StreamSlot::Metrics);
    let large = generator.period_data(&branch(20), PeriodType::Monthly, 0, &mut rng);

    assert!((large.metrics.anp.plan - small.metrics.anp.plan * 2.0).abs() <= 1.0);
}

#[test]
fn period_labels_match_the_period_type() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(3).for_stream(StreamSlot::Metrics);
    let b = branch(10);

    let monthly = generator.period_data(&b, PeriodType::Monthly, 0, &mut rng);
    assert_eq!(monthly.label, "2025年5月");
    let quarterly = generator.period_data(&b, PeriodType::Quarterly, 0, &mut rng);
    assert_eq!(quarterly.label, "2024年Q4");
    let yearly = generator.period_data(&b, PeriodType::Yearly, 0, &mut rng);
    assert_eq!(yearly.label, "2024年度");
}

#[test]
fn agent_list_matches_headcount_with_six_point_trends() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(9).for_stream(StreamSlot::Agents);
    let b = branch(12);

    let agents = generator.agent_performances(&b, &mut rng);

    assert_eq!(agents.len(), 12);
    for agent in &agents {
        assert_eq!(agent.trend.len(), 6);
        assert_eq!(agent.trend[0].month, "2025年1月");
        assert_eq!(agent.trend[5].month, "2025年6月");
        assert!(!agent.name.is_empty());
    }
}

/// Product-mix entries are apportioned from the branch total, so
/// they sum to it exactly.
#[test]
fn product_mix_sums_to_branch_total() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(21).for_stream(StreamSlot::Products);
    let b = branch(18);

    let mix = generator.product_mix(&b, &mut rng);

    assert_eq!(mix.len(), 5);
    let total: f64 = mix.iter().map(|e| e.anp).sum();
    assert!(total > 0.0);
    assert_eq!(total, total.round());
    for entry in &mix {
        if entry.contract_count > 0 {
            let expected = (entry.anp / entry.contract_count as f64 * 10.0).round() / 10.0;
            assert_eq!(entry.avg_contract_value, expected);
        }
    }
}

#[test]
fn contract_breakdown_invariants_hold() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(33).for_stream(StreamSlot::Contracts);
    let b = branch(16);

    let breakdown = generator.contract_breakdown(&b, &mut rng);

    assert_eq!(
        breakdown.net_increase,
        breakdown.new_contracts as i64 - breakdown.cancellations as i64
    );
    assert_eq!(breakdown.monthly_trend.len(), 6);

    let pct_sum: u32 = breakdown.channels.iter().map(|c| c.percentage).sum();
    assert_eq!(pct_sum, 100);
    let count_sum: u32 = breakdown.channels.iter().map(|c| c.count).sum();
    assert_eq!(count_sum, breakdown.new_contracts);
}

/// Each of the three partitions covers the whole population: counts
/// sum to the total and percentages sum to 100.
#[test]
fn customer_segments_partition_the_population() {
    let generator = SampleGenerator::new(today());
    let mut rng = RngBank::new(44).for_stream(StreamSlot::Segments);
    let b = branch(10);

    let segments = generator.customer_segments(&b, &mut rng);

    for partition in [&segments.by_age, &segments.by_gender, &segments.by_duration] {
        let count_sum: u32 = partition.iter().map(|s| s.contract_count).sum();
        assert_eq!(count_sum, segments.total_contracts);
        let pct_sum: u32 = partition.iter().map(|s| s.percentage).sum();
        assert_eq!(pct_sum, 100);
    }
}

/// The whole generated dataset is reproducible from the master seed.
#[test]
fn same_seed_reproduces_the_dataset() {
    let dir = Directory::default_test();
    let generator = SampleGenerator::new(today());

    let run = |seed: u64| {
        let mut rng = RngBank::new(seed).for_stream(StreamSlot::Metrics);
        dir.branches()
            .iter()
            .map(|b| generator.period_data(b, PeriodType::Monthly, 0, &mut rng))
            .map(|d| (d.metrics.anp.actual, d.metrics.contracts.actual))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(1234), run(1234));
    assert_ne!(run(1234), run(4321));
}
