use agencydesk_core::{
    distribution::{TargetSpec, ThemeDistribution, ThemeResponse},
    store::DeskStore,
    themes::{HearingRecord, MajorTheme},
};
use chrono::{NaiveDate, TimeZone, Utc};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn store() -> DeskStore {
    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hearing(id: &str, branch: &str, dept: &str, on: NaiveDate) -> HearingRecord {
    HearingRecord {
        id: id.into(),
        agency_id: "agency-001".into(),
        major: MajorTheme::Systems,
        middle: "ログイン".into(),
        detail: "接続不可".into(),
        content: "月初にログインできない事象の報告。".into(),
        staff_name: "鈴木 健一".into(),
        date: on,
        branch_id: branch.into(),
        department_id: dept.into(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn hearing_records_round_trip_ordered_by_date() {
    let store = store();
    store
        .insert_hearing(&hearing("hr-2", "branch-tokyo", "dept-east", date(2025, 6, 10)))
        .unwrap();
    store
        .insert_hearing(&hearing("hr-1", "branch-osaka", "dept-west", date(2025, 5, 1)))
        .unwrap();

    let records = store.hearing_records().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "hr-1");
    assert_eq!(records[1].id, "hr-2");
    assert_eq!(records[1].major, MajorTheme::Systems);
    assert_eq!(records[1].date, date(2025, 6, 10));
}

#[test]
fn hearing_filters_scope_by_unit() {
    let store = store();
    store
        .insert_hearing(&hearing("hr-1", "branch-tokyo", "dept-east", date(2025, 6, 1)))
        .unwrap();
    store
        .insert_hearing(&hearing("hr-2", "branch-yokohama", "dept-east", date(2025, 6, 2)))
        .unwrap();
    store
        .insert_hearing(&hearing("hr-3", "branch-osaka", "dept-west", date(2025, 6, 3)))
        .unwrap();

    let east = store.hearing_by_department("dept-east").unwrap();
    assert_eq!(east.len(), 2);

    let tokyo = store.hearing_by_branch("branch-tokyo").unwrap();
    assert_eq!(tokyo.len(), 1);
    assert_eq!(tokyo[0].id, "hr-1");

    assert!(store.hearing_by_department("dept-nowhere").unwrap().is_empty());
}

/// Other themes persist as their raw label and come back as Other.
#[test]
fn other_theme_label_survives_the_round_trip() {
    let store = store();
    let mut record = hearing("hr-1", "branch-tokyo", "dept-east", date(2025, 6, 1));
    record.major = MajorTheme::Other("未分類の声".into());
    store.insert_hearing(&record).unwrap();

    let records = store.hearing_records().unwrap();
    assert_eq!(records[0].major, MajorTheme::Other("未分類の声".into()));
}

#[test]
fn distribution_target_spec_round_trips() {
    let store = store();
    let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

    for target in [
        TargetSpec::All,
        TargetSpec::Departments(vec!["dept-east".into(), "dept-west".into()]),
        TargetSpec::Branches(vec!["branch-tokyo".into()]),
    ] {
        let dist = ThemeDistribution::new(
            "タイトル".into(),
            "本文".into(),
            MajorTheme::Product,
            "新商品".into(),
            "販売開始".into(),
            date(2025, 6, 1),
            date(2025, 6, 30),
            true,
            target.clone(),
            created_at,
        )
        .unwrap();
        store.create_distribution(&dist).unwrap();

        let loaded = store.find_distribution(&dist.id).unwrap().unwrap();
        assert_eq!(loaded.target, target);
        assert_eq!(loaded.title, dist.title);
        assert_eq!(loaded.starts_on, dist.starts_on);
        assert_eq!(loaded.ends_on, dist.ends_on);
        assert!(loaded.required);
        assert_eq!(loaded.created_at, created_at);
    }
}

#[test]
fn distributions_list_newest_first() {
    let store = store();
    let mk = |title: &str, h: u32| {
        ThemeDistribution::new(
            title.into(),
            "本文".into(),
            MajorTheme::Product,
            "m".into(),
            "d".into(),
            date(2025, 6, 1),
            date(2025, 6, 30),
            false,
            TargetSpec::All,
            Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap(),
        )
        .unwrap()
    };
    store.create_distribution(&mk("older", 8)).unwrap();
    store.create_distribution(&mk("newer", 15)).unwrap();

    let all = store.distributions().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "newer");
    assert_eq!(all[1].title, "older");
}

#[test]
fn find_distribution_returns_none_for_unknown_id() {
    let store = store();
    assert!(store.find_distribution("dist-nowhere").unwrap().is_none());
}

#[test]
fn responses_are_scoped_to_their_distribution() {
    let store = store();
    let mk_dist = |title: &str| {
        ThemeDistribution::new(
            title.into(),
            "本文".into(),
            MajorTheme::Training,
            "m".into(),
            "d".into(),
            date(2025, 6, 1),
            date(2025, 6, 30),
            true,
            TargetSpec::All,
            Utc::now(),
        )
        .unwrap()
    };
    let first = mk_dist("first");
    let second = mk_dist("second");
    store.create_distribution(&first).unwrap();
    store.create_distribution(&second).unwrap();

    let mk_resp = |n: u32, dist: &ThemeDistribution| ThemeResponse {
        id: format!("resp-{n:03}"),
        distribution_id: dist.id.clone(),
        agency_id: format!("agency-{n:03}"),
        branch_id: "branch-tokyo".into(),
        department_id: "dept-east".into(),
        note: (n == 1).then(|| "資料を受領しました".to_string()),
        responded_at: Utc.with_ymd_and_hms(2025, 6, 2, 9, n, 0).unwrap(),
    };
    store.insert_response(&mk_resp(1, &first)).unwrap();
    store.insert_response(&mk_resp(2, &first)).unwrap();
    store.insert_response(&mk_resp(3, &second)).unwrap();

    let responses = store.responses_for(&first.id).unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].id, "resp-001");
    assert_eq!(responses[0].note.as_deref(), Some("資料を受領しました"));
    assert_eq!(responses[1].note, None);

    assert_eq!(store.responses_for(&second.id).unwrap().len(), 1);
}

/// Responses reference their distribution; the schema enforces it.
#[test]
fn orphan_response_is_rejected() {
    let store = store();
    let orphan = ThemeResponse {
        id: "resp-999".into(),
        distribution_id: "dist-nowhere".into(),
        agency_id: "agency-001".into(),
        branch_id: "branch-tokyo".into(),
        department_id: "dept-east".into(),
        note: None,
        responded_at: Utc::now(),
    };
    assert!(store.insert_response(&orphan).is_err());
}
