//! Reporting periods and KPI primitives.
//!
//! Period offset 0 always means the most recent *closed* period
//! relative to an injected reference date. Quarters and years follow
//! the Japanese fiscal calendar (April start).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// The single shared achievement-rate primitive: actual / plan * 100,
/// rounded to one decimal. Every roll-up computes its rate through
/// this function from raw plan/actual totals — never by averaging
/// per-unit rates.
pub fn achievement_rate(plan: f64, actual: f64) -> f64 {
    if plan <= 0.0 {
        return 0.0;
    }
    round1(actual / plan * 100.0)
}

/// A plan/actual pair with its derived achievement rate.
///
/// The rate is always computed at construction — it cannot desync
/// from its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiMetric {
    pub plan: f64,
    pub actual: f64,
    pub rate: f64,
}

impl KpiMetric {
    pub fn new(plan: f64, actual: f64) -> Self {
        Self {
            plan,
            actual,
            rate: achievement_rate(plan, actual),
        }
    }

    pub fn zero() -> Self {
        Self {
            plan: 0.0,
            actual: 0.0,
            rate: 0.0,
        }
    }
}

/// The three KPIs tracked for every organizational unit and period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiBundle {
    pub anp: KpiMetric,
    pub contracts: KpiMetric,
    pub continuation: KpiMetric,
}

/// One unit's KPIs for one resolved period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodData {
    pub label: String,
    pub period_type: PeriodType,
    pub metrics: KpiBundle,
}

/// A resolved reporting period: display label plus, for monthly
/// periods, the calendar month driving the seasonal factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub label: String,
    pub period_type: PeriodType,
    /// (year, month) for monthly periods; None otherwise.
    pub calendar_month: Option<(i32, u32)>,
}

/// Resolve the period `offset` steps before the most recent closed
/// period relative to `today`.
pub fn resolve_period(period_type: PeriodType, today: NaiveDate, offset: u32) -> Period {
    match period_type {
        PeriodType::Monthly => {
            let (y, m) = shift_month(today.year(), today.month(), offset + 1);
            Period {
                label: month_label(y, m),
                period_type,
                calendar_month: Some((y, m)),
            }
        }
        PeriodType::Quarterly => {
            // Index of the fiscal quarter containing `today`, counted
            // from year 0. April-aligned: month index 3 starts Q1.
            let months = today.year() as i64 * 12 + today.month() as i64 - 1 - 3;
            let current_q = months.div_euclid(3);
            let q = current_q - 1 - offset as i64;
            // Shift so that April = position 0 within the fiscal year.
            let fiscal_pos = q * 3;
            let fiscal_year = fiscal_pos.div_euclid(12);
            let quarter_no = fiscal_pos.rem_euclid(12) / 3 + 1;
            Period {
                label: format!("{fiscal_year}年Q{quarter_no}"),
                period_type,
                calendar_month: None,
            }
        }
        PeriodType::Yearly => {
            let current_fy = if today.month() >= 4 {
                today.year()
            } else {
                today.year() - 1
            };
            let fy = current_fy - 1 - offset as i32;
            Period {
                label: format!("{fy}年度"),
                period_type,
                calendar_month: None,
            }
        }
    }
}

pub fn month_label(year: i32, month: u32) -> String {
    format!("{year}年{month}月")
}

/// Step (year, month) back by `back` months.
fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let total = year as i64 * 12 + month as i64 - 1 - back as i64;
    (total.div_euclid(12) as i32, (total.rem_euclid(12) + 1) as u32)
}

/// The trailing `n` calendar months ending with the month of `today`,
/// ascending. Used for trend series and the hearing timeline.
pub fn trailing_months(today: NaiveDate, n: u32) -> Vec<(i32, u32)> {
    (0..n)
        .rev()
        .map(|back| shift_month(today.year(), today.month(), back))
        .collect()
}
