use std::collections::HashMap;

use chrono::{Duration, NaiveDate, TimeZone};

use crate::models::{CategoryRollup, DailyRollup, NormalizedRecord};

pub const TREND_WINDOW_DAYS: usize = 7;
/// Longest window `group_by_day` will build, roughly ten years.
pub const MAX_WINDOW_DAYS: usize = 3650;

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: usize,
    total_score: f64,
}

impl Accumulator {
    fn add(&mut self, score: f64) {
        self.count += 1;
        self.total_score += score;
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_score / self.count as f64
        }
    }
}

/// Groups records by exact category and orders the groups by count,
/// descending. Categories with equal counts keep the order in which they were
/// first seen.
pub fn group_by_category(records: &[NormalizedRecord]) -> Vec<CategoryRollup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Accumulator)> = Vec::new();

    for record in records {
        let position = *positions.entry(record.category.as_str()).or_insert_with(|| {
            groups.push((record.category.as_str(), Accumulator::default()));
            groups.len() - 1
        });
        groups[position].1.add(record.score);
    }

    let mut ranked: Vec<(usize, &str, Accumulator)> = groups
        .into_iter()
        .enumerate()
        .map(|(first_seen, (category, acc))| (first_seen, category, acc))
        .collect();
    // sort_by is stable, so ties stay in first-seen order.
    ranked.sort_by(|a, b| b.2.count.cmp(&a.2.count));

    ranked
        .into_iter()
        .enumerate()
        .map(|(display_order, (first_seen, category, acc))| CategoryRollup {
            category: category.to_string(),
            count: acc.count,
            average_score: acc.average(),
            display_order,
            first_seen,
        })
        .collect()
}

/// Buckets records into one slot per calendar day of
/// `[reference_date - (window_days - 1), reference_date]`, oldest first.
///
/// Days are taken in `zone`. Records outside the window are ignored and
/// empty days are zero-filled. The window is clamped to
/// `1..=MAX_WINDOW_DAYS`.
pub fn group_by_day<Tz: TimeZone>(
    records: &[NormalizedRecord],
    reference_date: NaiveDate,
    window_days: usize,
    zone: &Tz,
) -> Vec<DailyRollup> {
    let window_days = window_days.clamp(1, MAX_WINDOW_DAYS);
    let start = reference_date - Duration::days(window_days as i64 - 1);
    let mut slots = vec![Accumulator::default(); window_days];

    for record in records {
        let day = record.created_at.with_timezone(zone).date_naive();
        let offset = (day - start).num_days();
        if offset < 0 || offset >= window_days as i64 {
            continue;
        }
        slots[offset as usize].add(record.score);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(offset, acc)| DailyRollup {
            date: start + Duration::days(offset as i64),
            count: acc.count,
            average_score: acc.average(),
        })
        .collect()
}

pub fn weekly_trend<Tz: TimeZone>(
    records: &[NormalizedRecord],
    reference_date: NaiveDate,
    zone: &Tz,
) -> Vec<DailyRollup> {
    group_by_day(records, reference_date, TREND_WINDOW_DAYS, zone)
}

pub fn average_score(records: &[NormalizedRecord]) -> f64 {
    let mut acc = Accumulator::default();
    for record in records {
        acc.add(record.score);
    }
    acc.average()
}
