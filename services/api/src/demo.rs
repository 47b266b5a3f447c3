use crate::infra::{parse_date, EngagementStack, DEMO_CUSTOMER};
use checkup::engagement::{
    add_one_month, Clock, CustomerId, FixedClock, ScoreCategory, UserScoreSummary,
};
use checkup::error::AppError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Customer identifier to replay confirmations for
    #[arg(long, default_value = DEMO_CUSTOMER)]
    pub(crate) customer: String,
    /// Number of monthly review rounds to simulate
    #[arg(long, default_value_t = 6)]
    pub(crate) months: u32,
    /// Date of the first review round (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DemoRound {
    pub(crate) reviewed_at: DateTime<Utc>,
    pub(crate) points_gained: i64,
    pub(crate) new_badges: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DemoReport {
    pub(crate) rounds: Vec<DemoRound>,
    pub(crate) summary: UserScoreSummary,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        customer,
        months,
        start,
    } = args;

    let start = match start {
        Some(date) => date.and_hms_opt(9, 0, 0).unwrap_or_default().and_utc(),
        None => Utc::now(),
    };
    let report = replay(&CustomerId::new(customer), months, start)?;

    println!("Account checkup demo for customer {}", report.summary.customer_id);
    for round in &report.rounds {
        println!(
            "  {}  +{} points  {}",
            round.reviewed_at.format("%Y-%m-%d"),
            round.points_gained,
            if round.new_badges.is_empty() {
                "-".to_string()
            } else {
                round.new_badges.join(", ")
            }
        );
    }

    let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

/// Confirm every category once per round, moving the clock just past each cooldown.
pub(crate) fn replay(
    customer: &CustomerId,
    months: u32,
    start: DateTime<Utc>,
) -> Result<DemoReport, AppError> {
    let clock = Arc::new(FixedClock::new(start));
    let stack = EngagementStack::in_memory(clock.clone());
    let mut rounds = Vec::with_capacity(months as usize);

    for _ in 0..months {
        let reviewed_at = clock.now();
        let mut points_gained = 0;
        let mut new_badges = Vec::new();

        for category in ScoreCategory::PRIMARY {
            let outcome = stack.engine.confirm_category(customer, category)?;
            points_gained += outcome.points_gained;
            new_badges.extend(outcome.new_badges.iter().map(|badge| badge.code));
        }

        rounds.push(DemoRound {
            reviewed_at,
            points_gained,
            new_badges,
        });
        clock.set(add_one_month(reviewed_at) + Duration::days(1));
    }

    let summary = stack.ranker.score_summary(customer)?;
    Ok(DemoReport { rounds, summary })
}
