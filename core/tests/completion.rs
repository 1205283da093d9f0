use agencydesk_core::{
    directory::Directory,
    distribution::{completion, TargetSpec, ThemeDistribution, ThemeResponse},
    themes::MajorTheme,
};
use chrono::{NaiveDate, TimeZone, Utc};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn distribution(target: TargetSpec) -> ThemeDistribution {
    ThemeDistribution::new(
        "研修受講状況の確認".into(),
        "今月の研修受講状況を回答してください。".into(),
        MajorTheme::Training,
        "商品研修".into(),
        "受講確認".into(),
        date(2025, 6, 1),
        date(2025, 6, 30),
        true,
        target,
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    )
    .unwrap()
}

fn response(dist: &ThemeDistribution, n: u32, agency: &str, branch: &str, dept: &str) -> ThemeResponse {
    ThemeResponse {
        id: format!("resp-{n:03}"),
        distribution_id: dist.id.clone(),
        agency_id: agency.into(),
        branch_id: branch.into(),
        department_id: dept.into(),
        note: None,
        responded_at: Utc.with_ymd_and_hms(2025, 6, 2, 10, n, 0).unwrap(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// 5 unique agencies against a 12-agent branch is 42%, from
/// round(5/12*100).
#[test]
fn branch_rate_counts_unique_agencies_against_headcount() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::Branches(vec!["branch-yokohama".into()]));

    let responses: Vec<ThemeResponse> = (0..5)
        .map(|i| {
            response(
                &dist,
                i,
                &format!("agency-y{i}"),
                "branch-yokohama",
                "dept-east",
            )
        })
        .collect();

    let report = completion(&dist, &responses, &dir);

    assert_eq!(report.responded, 5);
    assert_eq!(report.target, 12);
    assert_eq!(report.rate, 42);
}

/// Several rows from the same agency count once.
#[test]
fn duplicate_responses_are_deduplicated() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::Branches(vec!["branch-kobe".into()]));

    let responses = vec![
        response(&dist, 1, "agency-005", "branch-kobe", "dept-west"),
        response(&dist, 2, "agency-005", "branch-kobe", "dept-west"),
        response(&dist, 3, "agency-005", "branch-kobe", "dept-west"),
    ];

    let report = completion(&dist, &responses, &dir);

    assert_eq!(report.responded, 1);
    assert_eq!(report.target, 8);
    assert_eq!(report.rate, 13); // round(1/8*100)
}

/// Responses tagged with another distribution id are ignored.
#[test]
fn foreign_responses_do_not_count() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::All);
    let other = distribution(TargetSpec::All);

    let stray = response(&other, 1, "agency-001", "branch-tokyo", "dept-east");

    let report = completion(&dist, &[stray], &dir);

    assert_eq!(report.responded, 0);
    assert_eq!(report.rate, 0);
}

#[test]
fn empty_target_population_yields_zero_rate() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::Branches(vec![]));

    let report = completion(&dist, &[], &dir);

    assert_eq!(report.target, 0);
    assert_eq!(report.rate, 0);
    assert!(report.departments.is_empty());
}

#[test]
fn department_target_scopes_to_member_branches() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::Departments(vec!["dept-east".into()]));

    let responses = vec![
        response(&dist, 1, "agency-001", "branch-tokyo", "dept-east"),
        // Out of scope: west branch, must not appear in the report.
        response(&dist, 2, "agency-004", "branch-osaka", "dept-west"),
    ];

    let report = completion(&dist, &responses, &dir);

    assert_eq!(report.departments.len(), 1);
    assert_eq!(report.departments[0].department_id, "dept-east");
    assert_eq!(report.target, 20 + 12);
    assert_eq!(report.responded, 1);
}

/// Overall and department rates come from summed numerators and
/// denominators, not from averaging branch rates.
#[test]
fn rates_are_summed_not_averaged() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::Departments(vec!["dept-east".into()]));

    // tokyo: 10/20 = 50%; yokohama: 12/12 = 100%.
    let mut responses = Vec::new();
    for i in 0..10 {
        responses.push(response(
            &dist,
            i,
            &format!("agency-t{i}"),
            "branch-tokyo",
            "dept-east",
        ));
    }
    for i in 0..12 {
        responses.push(response(
            &dist,
            20 + i,
            &format!("agency-y{i}"),
            "branch-yokohama",
            "dept-east",
        ));
    }

    let report = completion(&dist, &responses, &dir);
    let dept = &report.departments[0];

    // 22/32 = 69%, not the naive (50+100)/2 = 75%.
    assert_eq!(dept.responded, 22);
    assert_eq!(dept.target, 32);
    assert_eq!(dept.rate, 69);
    assert_eq!(report.rate, 69);

    let tokyo = dept.branches.iter().find(|b| b.branch_id == "branch-tokyo").unwrap();
    assert_eq!(tokyo.rate, 50);
    let yokohama = dept
        .branches
        .iter()
        .find(|b| b.branch_id == "branch-yokohama")
        .unwrap();
    assert_eq!(yokohama.rate, 100);
}

#[test]
fn all_target_covers_every_branch_grouped_by_department() {
    let dir = Directory::default_test();
    let dist = distribution(TargetSpec::All);

    let report = completion(&dist, &[], &dir);

    assert_eq!(report.departments.len(), 2);
    assert_eq!(report.departments[0].department_id, "dept-east");
    assert_eq!(report.departments[0].branches.len(), 2);
    assert_eq!(report.departments[1].branches.len(), 2);
    assert_eq!(report.target, 20 + 12 + 16 + 8);
}

#[test]
fn inverted_date_range_is_rejected() {
    let result = ThemeDistribution::new(
        "t".into(),
        "c".into(),
        MajorTheme::Product,
        "m".into(),
        "d".into(),
        date(2025, 6, 30),
        date(2025, 6, 1),
        false,
        TargetSpec::All,
        Utc::now(),
    );
    assert!(result.is_err());
}
