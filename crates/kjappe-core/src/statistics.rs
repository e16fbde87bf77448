//! Aggregate statistics for players and for the whole player base.
//!
//! Server-side numbers are computed from stored [`SubmissionRecord`]s; the
//! player's own numbers come from local history. The weekly chart lines the
//! two up per day.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datekey::{canonical_key, iso_date, parse_date_input};
use crate::model::{DailySummary, WeeklySummary};

/// Number of questions in a regular quiz.
pub const DEFAULT_QUESTIONS_PER_QUIZ: usize = 5;

/// Norwegian weekday names, Monday first.
pub const WEEK_DAYS: [&str; 7] = [
    "Mandag", "Tirsdag", "Onsdag", "Torsdag", "Fredag", "Lørdag", "Søndag",
];

/// One stored submission, as kept by the submission sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub number_of_correct: usize,
    pub answers: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// ISO date the submission is grouped under.
    pub submission_date: String,
}

impl SubmissionRecord {
    pub fn new(answers: Vec<String>, number_of_correct: usize, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number_of_correct,
            answers,
            submission_date: iso_date(created_at.date_naive()),
            created_at,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Fraction of correct answers across all submissions on `day`, rounded to
/// two decimals. Zero when nobody played.
pub fn daily_average(
    records: &[SubmissionRecord],
    day: NaiveDate,
    questions_per_quiz: usize,
) -> DailySummary {
    let day = iso_date(day);
    let (correct, submissions) = records
        .iter()
        .filter(|r| r.submission_date == day)
        .fold((0usize, 0usize), |(c, n), r| (c + r.number_of_correct, n + 1));

    let average_correct = if submissions > 0 && questions_per_quiz > 0 {
        round2(correct as f64 / (submissions * questions_per_quiz) as f64)
    } else {
        0.0
    };

    DailySummary {
        average_correct,
        total_submissions: Some(submissions as u64),
    }
}

/// Monday through Friday of the week containing `today`.
///
/// Sunday belongs to the week that started six days earlier.
pub fn week_range(today: NaiveDate) -> [NaiveDate; 5] {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// The week's aggregate across all submissions.
pub fn weekly_summary(
    records: &[SubmissionRecord],
    today: NaiveDate,
    questions_per_quiz: usize,
) -> WeeklySummary {
    let days = week_range(today);
    let mut daily_average_stats = BTreeMap::new();
    let mut total_correct = 0usize;
    let mut total_submissions = 0usize;

    for day in days {
        let key = iso_date(day);
        let (correct, submissions) = records
            .iter()
            .filter(|r| r.submission_date == key)
            .fold((0usize, 0usize), |(c, n), r| (c + r.number_of_correct, n + 1));

        let mean = if submissions > 0 {
            correct as f64 / submissions as f64
        } else {
            0.0
        };
        daily_average_stats.insert(key, mean);
        total_correct += correct;
        total_submissions += submissions;
    }

    let weekly_average = if total_submissions > 0 && questions_per_quiz > 0 {
        round2(total_correct as f64 / (total_submissions * questions_per_quiz) as f64)
    } else {
        0.0
    };

    WeeklySummary {
        weekly_average,
        total_submissions: total_submissions as u64,
        daily_average_stats,
        start_date: iso_date(days[0]),
        end_date: iso_date(days[4]),
    }
}

/// Mean correct count over the days the player actually played.
pub fn user_weekly_average(daily: &[(String, usize)]) -> f64 {
    let played: Vec<usize> = daily.iter().map(|(_, c)| *c).filter(|&c| c != 0).collect();
    if played.is_empty() {
        return 0.0;
    }
    played.iter().sum::<usize>() as f64 / played.len() as f64
}

/// Mean of the server's per-day averages.
pub fn server_weekly_average(summary: &WeeklySummary) -> f64 {
    let values = &summary.daily_average_stats;
    if values.is_empty() {
        return 0.0;
    }
    values.values().sum::<f64>() / values.len() as f64
}

/// Consecutive played days counting back from the most recent entry.
pub fn streak(daily: &[(String, usize)]) -> usize {
    daily.iter().rev().take_while(|(_, c)| *c > 0).count()
}

/// Whether the weekly summary is due.
pub fn is_friday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri
}

/// One bar pair in the weekly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDay {
    pub day: &'static str,
    pub date_key: String,
    pub user_correct: usize,
    pub average_correct: f64,
}

/// Line up the server's per-day averages with the player's own counts.
///
/// Server days are ISO dates; they are converted to canonical keys to look up
/// the player's count. Days are labelled by their position in the week.
pub fn weekly_chart(summary: &WeeklySummary, user_daily: &[(String, usize)]) -> Vec<ChartDay> {
    let user: BTreeMap<&str, usize> = user_daily.iter().map(|(k, c)| (k.as_str(), *c)).collect();

    summary
        .daily_average_stats
        .iter()
        .zip(WEEK_DAYS)
        .map(|((iso, average), day)| {
            let date_key = parse_date_input(iso)
                .map(canonical_key)
                .unwrap_or_else(|_| iso.replace('-', ""));
            ChartDay {
                day,
                user_correct: user.get(date_key.as_str()).copied().unwrap_or(0),
                date_key,
                average_correct: *average,
            }
        })
        .collect()
}

/// How an average score fills a row of boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBoxes {
    pub full: usize,
    /// Fill fraction of the partially filled box, `0.0` when there is none.
    pub partial: f64,
    pub empty: usize,
}

/// Split `average` (a fraction in `0.0..=1.0`) over `total` boxes.
pub fn score_boxes(average: f64, total: usize) -> ScoreBoxes {
    let scaled = (average.clamp(0.0, 1.0) * total as f64).max(0.0);
    let full = (scaled.floor() as usize).min(total);
    let partial = scaled.fract();
    let partial_box = usize::from(partial > 0.0);
    ScoreBoxes {
        full,
        partial,
        empty: total.saturating_sub(full + partial_box),
    }
}
