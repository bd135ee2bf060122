//! Display-ready views over rollups. Rounding happens here and nowhere else.

use serde::Serialize;

use crate::error::{AnalyticsError, Result};
use crate::models::{CategoryRollup, DailyRollup};

const DEFAULT_COLORS: [&str; 5] = [
    "bg-amber-400",
    "bg-emerald-400",
    "bg-blue-400",
    "bg-pink-400",
    "bg-indigo-400",
];

/// Ordered list of chart colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new<I, S>(colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.is_empty() {
            return Err(AnalyticsError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|color| color.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    #[serde(flatten)]
    pub rollup: CategoryRollup,
    pub percentage: f64,
}

impl From<CategoryRollup> for CategoryShare {
    fn from(rollup: CategoryRollup) -> Self {
        Self {
            rollup,
            percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub count: usize,
    pub average_score: i64,
    pub percentage: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub count: usize,
    pub average_score: i64,
}

/// Attaches each rollup's share of the total count. Shares computed earlier
/// are accepted too and simply get their percentage recomputed.
pub fn with_percentage_of_total<I, T>(rollups: I) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = T>,
    T: Into<CategoryShare>,
{
    let mut shares: Vec<CategoryShare> = rollups.into_iter().map(Into::into).collect();
    let total: usize = shares.iter().map(|share| share.rollup.count).sum();

    for share in &mut shares {
        share.percentage = if total == 0 {
            0.0
        } else {
            share.rollup.count as f64 / total as f64 * 100.0
        };
    }
    shares
}

/// Positional palette colors for the first `palette.len()` categories, then a
/// hash of the name so overflow categories keep their color across renders.
pub fn assign_display_color<'a>(category: &str, index: usize, palette: &'a Palette) -> &'a str {
    let colors = palette.colors();
    if index < colors.len() {
        return &colors[index];
    }
    &colors[category_hash(category) as usize % colors.len()]
}

fn category_hash(category: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in category.encode_utf16() {
        hash = i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    hash as u32
}

pub fn display_label(category: &str) -> String {
    if category.trim().is_empty() {
        return "Uncategorized".to_string();
    }
    category
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn round_display(value: f64) -> i64 {
    value.round() as i64
}

pub fn breakdown_rows(rollups: &[CategoryRollup], palette: &Palette) -> Vec<BreakdownRow> {
    with_percentage_of_total(rollups.iter().cloned())
        .into_iter()
        .map(|share| BreakdownRow {
            label: display_label(&share.rollup.category),
            count: share.rollup.count,
            average_score: round_display(share.rollup.average_score),
            percentage: round_display(share.percentage),
            // Keyed on first appearance so a category keeps its color when the ranking shifts.
            color: assign_display_color(&share.rollup.category, share.rollup.first_seen, palette)
                .to_string(),
        })
        .collect()
}

pub fn trend_points(days: &[DailyRollup]) -> Vec<TrendPoint> {
    days.iter()
        .map(|day| TrendPoint {
            label: day.date.format("%b %d").to_string(),
            count: day.count,
            average_score: round_display(day.average_score),
        })
        .collect()
}
