//! desk-runner: headless runner for the agency support dashboard.
//!
//! Usage:
//!   desk-runner --seed 42 --records 400 --db desk.db
//!   desk-runner --seed 42 --ipc-mode

use agencydesk_core::{
    aggregate::{self, RankKey},
    directory::Directory,
    distribution::{self, TargetSpec, ThemeDistribution},
    drafting::{request_draft, CannedDrafter},
    generator::SampleGenerator,
    period::PeriodType,
    rng::{RngBank, StreamSlot},
    sample,
    store::DeskStore,
    themes::{self, Granularity, MajorTheme},
};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetDashboard,
    ThemeAnalytics {
        department_id: Option<String>,
    },
    Completion {
        distribution_id: String,
    },
    CreateDistribution {
        title: String,
        content: String,
        major: String,
        middle: String,
        detail: String,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        required: bool,
        target: TargetSpec,
    },
    Draft {
        prompt: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct DashboardState {
    company: aggregate::Rollup,
    departments: Vec<aggregate::Rollup>,
    branch_ranking: Vec<aggregate::BranchSummary>,
    theme_distribution: Vec<themes::ThemeCount>,
    top_issues: Vec<themes::TopIssue>,
}

struct Runner {
    directory: Directory,
    store: DeskStore,
    generator: SampleGenerator,
    bank: RngBank,
    today: NaiveDate,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let records = parse_arg(&args, "--records", 400usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let today = args
        .windows(2)
        .find(|w| w[0] == "--today")
        .and_then(|w| w[1].parse().ok())
        .unwrap_or_else(|| Utc::now().date_naive());

    if !ipc_mode {
        println!("Agency Support Desk — desk-runner");
        println!("  seed:     {seed}");
        println!("  records:  {records}");
        println!("  db:       {db}");
        println!("  data_dir: {data_dir}");
        println!("  today:    {today}");
        println!();
    }

    let directory = Directory::load(data_dir)?;
    let store = if db == ":memory:" {
        DeskStore::in_memory()?
    } else {
        DeskStore::open(db)?
    };
    store.migrate()?;

    let runner = Runner {
        generator: SampleGenerator::new(today),
        bank: RngBank::new(seed),
        directory,
        store,
        today,
    };
    runner.seed_demo_data(records)?;

    if ipc_mode {
        run_ipc_loop(&runner)?;
    } else {
        print_summary(&runner)?;
    }

    Ok(())
}

impl Runner {
    /// Populate the store with a hearing corpus plus one distribution
    /// and its responses, so every dashboard view has data.
    fn seed_demo_data(&self, records: usize) -> Result<()> {
        let mut hearing_rng = self.bank.for_stream(StreamSlot::Hearing);
        for record in sample::hearing_records(&self.directory, records, self.today, &mut hearing_rng)
        {
            self.store.insert_hearing(&record)?;
        }

        let dist = ThemeDistribution::new(
            "新商品販売開始のご案内".into(),
            "新しい医療保険の販売を開始します。販売資格と研修受講状況をご確認ください。".into(),
            MajorTheme::Product,
            "新商品".into(),
            "販売開始".into(),
            self.today,
            self.today + chrono::Duration::days(14),
            true,
            TargetSpec::All,
            Utc::now(),
        )?;
        self.store.create_distribution(&dist)?;

        let mut response_rng = self.bank.for_stream(StreamSlot::Responses);
        for response in
            sample::responses(&dist, &self.directory, 0.6, self.today, &mut response_rng)
        {
            self.store.insert_response(&response)?;
        }

        log::info!(
            "seeded {} hearing records and 1 distribution",
            self.store.hearing_records()?.len()
        );
        Ok(())
    }

    fn dashboard(&self) -> Result<DashboardState> {
        let mut rng = self.bank.for_stream(StreamSlot::Metrics);
        let company =
            aggregate::company_rollup(&self.directory, &self.generator, PeriodType::Monthly, 0, &mut rng);
        let departments = self
            .directory
            .departments()
            .iter()
            .map(|d| {
                aggregate::department_rollup(
                    &self.directory,
                    &self.generator,
                    &d.id,
                    PeriodType::Monthly,
                    0,
                    &mut rng,
                )
            })
            .collect();
        let rows = aggregate::branch_summaries(
            &self.directory,
            &self.generator,
            None,
            PeriodType::Monthly,
            0,
            &mut rng,
        );
        let branch_ranking = aggregate::rank_branches(rows, RankKey::Achievement);

        let hearings = self.store.hearing_records()?;
        Ok(DashboardState {
            company,
            departments,
            branch_ranking,
            theme_distribution: themes::theme_distribution(&hearings),
            top_issues: themes::top_issues(&hearings, 10),
        })
    }
}

fn run_ipc_loop(runner: &Runner) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetDashboard => serde_json::to_value(runner.dashboard()?)?,
            IpcCommand::ThemeAnalytics { department_id } => {
                let records = match department_id {
                    Some(id) => runner.store.hearing_by_department(&id)?,
                    None => runner.store.hearing_records()?,
                };
                serde_json::json!({
                    "distribution": themes::theme_distribution(&records),
                    "timeline": themes::timeline(&records, runner.today),
                    "comparison": themes::unit_comparison(
                        &records, &runner.directory, Granularity::Department),
                })
            }
            IpcCommand::Completion { distribution_id } => {
                match runner.store.find_distribution(&distribution_id)? {
                    Some(dist) => {
                        let responses = runner.store.responses_for(&distribution_id)?;
                        serde_json::to_value(distribution::completion(
                            &dist,
                            &responses,
                            &runner.directory,
                        ))?
                    }
                    None => serde_json::json!({ "error": "distribution not found" }),
                }
            }
            IpcCommand::CreateDistribution {
                title,
                content,
                major,
                middle,
                detail,
                starts_on,
                ends_on,
                required,
                target,
            } => {
                let dist = ThemeDistribution::new(
                    title,
                    content,
                    MajorTheme::from(major),
                    middle,
                    detail,
                    starts_on,
                    ends_on,
                    required,
                    target,
                    Utc::now(),
                )?;
                runner.store.create_distribution(&dist)?;
                serde_json::json!({ "created": dist.id })
            }
            IpcCommand::Draft { prompt } => match request_draft(&CannedDrafter, &prompt) {
                Ok(draft) => serde_json::to_value(draft)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
        };
        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(runner: &Runner) -> Result<()> {
    let state = runner.dashboard()?;

    println!("=== 全社KPI ({}) ===", state.company.label);
    println!(
        "  ANP:     plan {:.0} / actual {:.0} ({:.1}%)",
        state.company.metrics.anp.plan,
        state.company.metrics.anp.actual,
        state.company.metrics.anp.rate,
    );
    println!(
        "  新契約:  plan {:.0} / actual {:.0} ({:.1}%)",
        state.company.metrics.contracts.plan,
        state.company.metrics.contracts.actual,
        state.company.metrics.contracts.rate,
    );
    println!(
        "  継続率:  plan {:.1} / actual {:.1} ({:.1}%)",
        state.company.metrics.continuation.plan,
        state.company.metrics.continuation.actual,
        state.company.metrics.continuation.rate,
    );

    println!();
    println!("=== 支社ランキング (達成率) ===");
    for (i, row) in state.branch_ranking.iter().enumerate() {
        println!(
            "  {:>2}. {} — ANP {:.0} ({:.1}%)",
            i + 1,
            row.name,
            row.metrics.anp.actual,
            row.metrics.anp.rate,
        );
    }

    println!();
    println!("=== ヒアリング テーマ分布 ===");
    for entry in &state.theme_distribution {
        println!(
            "  {:<10} {:>4}件 ({:>3}%)",
            entry.theme.label(),
            entry.count,
            entry.percentage,
        );
    }

    println!();
    println!("=== 上位課題 ===");
    for issue in state.top_issues.iter().take(5) {
        println!(
            "  [{} / {}] {}件 — {}",
            issue.major.label(),
            issue.middle,
            issue.count,
            issue.sample,
        );
    }

    // Completion for the seeded distribution.
    if let Some(dist) = runner.store.distributions()?.first() {
        let responses = runner.store.responses_for(&dist.id)?;
        let report = distribution::completion(dist, &responses, &runner.directory);
        println!();
        println!("=== 配信 回答状況: {} ===", dist.title);
        println!(
            "  全体: {}/{} ({}%)",
            report.responded, report.target, report.rate
        );
        for dept in &report.departments {
            println!(
                "    {} — {}/{} ({}%)",
                dept.name, dept.responded, dept.target, dept.rate
            );
        }
    }

    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
