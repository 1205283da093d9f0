//! Deterministic sample data from curated text pools.
//!
//! Fabricates hearing records and survey responses that read like
//! real field input. Same RNG seed = same corpus.

use crate::{
    directory::Directory,
    distribution::{TargetSpec, ThemeDistribution, ThemeResponse},
    rng::StreamRng,
    themes::{HearingRecord, MajorTheme},
};
use chrono::{Duration, NaiveDate};

/// Generate a staff/agent full name from curated pools.
pub fn full_name(rng: &mut StreamRng) -> String {
    let surname = SURNAMES[rng.below(SURNAMES.len() as u64) as usize];
    let given = GIVEN_NAMES[rng.below(GIVEN_NAMES.len() as u64) as usize];
    format!("{surname} {given}")
}

/// Fabricate `count` hearing records spread over the trailing 180
/// days, attributed to random agencies with branch/department
/// resolved through the directory.
pub fn hearing_records(
    directory: &Directory,
    count: usize,
    today: NaiveDate,
    rng: &mut StreamRng,
) -> Vec<HearingRecord> {
    let agencies = directory.agencies();
    if agencies.is_empty() {
        return Vec::new();
    }

    (0..count)
        .filter_map(|i| {
            let agency = &agencies[rng.below(agencies.len() as u64) as usize];
            let (branch, department) = directory.resolve_agency(&agency.id)?;
            let (major_label, middle, detail, content) =
                TOPICS[rng.below(TOPICS.len() as u64) as usize];
            let days_back = rng.below(180) as i64;
            Some(HearingRecord {
                id: format!("hr-{:04}", i + 1),
                agency_id: agency.id.clone(),
                major: MajorTheme::from(major_label.to_string()),
                middle: middle.to_string(),
                detail: detail.to_string(),
                content: content.to_string(),
                staff_name: full_name(rng),
                date: today - Duration::days(days_back),
                branch_id: branch.id.clone(),
                department_id: department.id.clone(),
            })
        })
        .collect()
}

/// Fabricate responses to a distribution: each in-scope agency
/// responds with probability `participation`, and a few respond
/// twice — completion tracking must deduplicate those.
pub fn responses(
    distribution: &ThemeDistribution,
    directory: &Directory,
    participation: f64,
    today: NaiveDate,
    rng: &mut StreamRng,
) -> Vec<ThemeResponse> {
    let in_scope_branch = |branch_id: &str| match &distribution.target {
        TargetSpec::All => true,
        TargetSpec::Departments(ids) => directory
            .department_of(branch_id)
            .is_some_and(|d| ids.contains(&d.id)),
        TargetSpec::Branches(ids) => ids.iter().any(|id| id == branch_id),
    };

    let mut out = Vec::new();
    let mut seq = 0u32;
    for agency in directory.agencies() {
        if !in_scope_branch(&agency.branch_id) || !rng.chance(participation) {
            continue;
        }
        let Some((branch, department)) = directory.resolve_agency(&agency.id) else {
            continue;
        };
        let mut push = |seq: &mut u32, rng: &mut StreamRng| {
            let responded_at = (today.and_hms_opt(9, 0, 0).expect("valid time")
                + Duration::minutes(rng.below(480) as i64))
            .and_utc();
            out.push(ThemeResponse {
                id: format!("resp-{:04}", { *seq += 1; *seq }),
                distribution_id: distribution.id.clone(),
                agency_id: agency.id.clone(),
                branch_id: branch.id.clone(),
                department_id: department.id.clone(),
                note: None,
                responded_at,
            });
        };
        push(&mut seq, rng);
        // Occasional duplicate submission from the same agency.
        if rng.chance(0.15) {
            push(&mut seq, rng);
        }
    }
    out
}

const SURNAMES: &[&str] = &[
    "佐藤", "鈴木", "高橋", "田中", "伊藤", "渡辺", "山本", "中村", "小林", "加藤",
    "吉田", "山田", "佐々木", "山口", "松本", "井上", "木村", "林", "斎藤", "清水",
];

const GIVEN_NAMES: &[&str] = &[
    "太郎", "健一", "直樹", "大輔", "翔太", "誠", "拓也", "亮",
    "花子", "美咲", "陽子", "恵", "由美", "さくら", "優子", "真由美",
];

/// (major, middle, detail, content) pools — three topics per known
/// major theme.
const TOPICS: &[(&str, &str, &str, &str)] = &[
    (
        "商品について",
        "新商品",
        "パンフレット",
        "新商品のパンフレットの給付条件の記載が分かりづらいとの声があった。",
    ),
    (
        "商品について",
        "既存商品",
        "保障内容",
        "医療保険の先進医療特約について顧客から質問が増えている。",
    ),
    (
        "商品について",
        "商品改定",
        "料率変更",
        "来期の料率改定の案内時期を早めてほしいとの要望。",
    ),
    (
        "営業支援",
        "販売ツール",
        "提案書",
        "提案書作成ツールの帳票が古い商品構成のままになっている。",
    ),
    (
        "営業支援",
        "同行支援",
        "訪問同行",
        "大型案件での支社担当者の同行依頼が増加している。",
    ),
    (
        "営業支援",
        "キャンペーン",
        "施策案内",
        "キャンペーン施策の対象条件が代理店に十分周知されていない。",
    ),
    (
        "事務手続き",
        "新契約",
        "申込書類",
        "申込書類の不備返戻が多く、記入例の改善を求める声があった。",
    ),
    (
        "事務手続き",
        "保全",
        "住所変更",
        "住所変更手続きのオンライン化を希望する代理店が多い。",
    ),
    (
        "事務手続き",
        "保険金",
        "請求手続",
        "保険金請求の必要書類について問い合わせが集中している。",
    ),
    (
        "システム",
        "代理店システム",
        "ログイン",
        "代理店システムのログインが月初に繋がりにくい。",
    ),
    (
        "システム",
        "代理店システム",
        "操作性",
        "試算画面の操作手順が多く、簡略化してほしいとの要望。",
    ),
    (
        "システム",
        "タブレット",
        "動作不良",
        "タブレット端末の申込アプリが途中で固まる事象の報告。",
    ),
    (
        "顧客対応",
        "苦情",
        "説明不足",
        "契約時の説明不足に起因する苦情が発生、再発防止策を検討中。",
    ),
    (
        "顧客対応",
        "満期対応",
        "満期案内",
        "満期案内の発送時期についての問い合わせが増えている。",
    ),
    (
        "顧客対応",
        "高齢者対応",
        "親族同席",
        "高齢契約者への説明時の親族同席ルールの確認依頼。",
    ),
    (
        "教育・研修",
        "商品研修",
        "新人向け",
        "新人向けの商品研修の回数を増やしてほしいとの要望。",
    ),
    (
        "教育・研修",
        "資格取得",
        "変額保険",
        "変額保険販売資格の取得支援について相談があった。",
    ),
    (
        "教育・研修",
        "コンプライアンス",
        "募集ルール",
        "募集ルール改定に関する研修資料の配布を希望する声。",
    ),
];
