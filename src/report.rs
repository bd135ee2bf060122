use std::fmt::Write;

use chrono::{NaiveDate, TimeZone};

use crate::drawback::format_usd;
use crate::error::Result;
use crate::format::{self, Palette};
use crate::models::{
    CategoryRollup, CloudStats, DailyRollup, InspectionRecord, InspectionStatus, ShipmentStats,
    Snapshot, StatusCounts,
};
use crate::{normalize, rollup, stats};

/// How many inspections the recent list shows.
pub const RECENT_INSPECTIONS: usize = 8;

/// Every rollup the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub reference_date: NaiveDate,
    pub inspections: Vec<InspectionRecord>,
    pub breakdown: Vec<CategoryRollup>,
    pub trend: Vec<DailyRollup>,
    pub statuses: StatusCounts,
    pub shipments: ShipmentStats,
    pub cloud: CloudStats,
}

impl Dashboard {
    pub fn from_snapshot<Tz: TimeZone>(
        snapshot: &Snapshot,
        reference_date: NaiveDate,
        zone: &Tz,
    ) -> Result<Self> {
        let inspections = normalize::inspections_from_values(&snapshot.inspections)?;
        let normalized = normalize::normalize(&inspections)?;
        let shipments = stats::shipments_from_values(&snapshot.shipments)?;
        let projects = stats::projects_from_values(&snapshot.projects)?;

        Ok(Self {
            reference_date,
            breakdown: rollup::group_by_category(&normalized),
            trend: rollup::weekly_trend(&normalized, reference_date, zone),
            statuses: stats::status_counts(&inspections),
            shipments: stats::shipment_stats(&shipments),
            cloud: stats::cloud_stats(&projects, &normalized),
            inspections,
        })
    }
}

pub fn build_report(dashboard: &Dashboard, palette: &Palette) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# QCForge Quality Report");
    let _ = writeln!(
        output,
        "Generated for the week ending {} ({} inspections)",
        dashboard.reference_date,
        dashboard.inspections.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Industry Breakdown");

    if dashboard.breakdown.is_empty() {
        let _ = writeln!(output, "No inspections recorded.");
    } else {
        for row in format::breakdown_rows(&dashboard.breakdown, palette) {
            let _ = writeln!(
                output,
                "- {}: {} inspections ({}% avg, {}% of total)",
                row.label, row.count, row.average_score, row.percentage
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Quality Trend");
    let _ = writeln!(output, "| Day | Inspections | Avg score |");
    let _ = writeln!(output, "| --- | ---: | ---: |");
    for point in format::trend_points(&dashboard.trend) {
        let average = if point.count == 0 {
            "-".to_string()
        } else {
            format!("{}%", point.average_score)
        };
        let _ = writeln!(output, "| {} | {} | {} |", point.label, point.count, average);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Inspection Status");
    let _ = writeln!(
        output,
        "- Pass: {}\n- Fail: {}\n- Review: {}",
        dashboard.statuses.pass, dashboard.statuses.fail, dashboard.statuses.needs_review
    );

    let shipments = &dashboard.shipments;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Shipments");
    let _ = writeln!(
        output,
        "- Total: {} ({} import, {} export)\n- In transit: {}\n- Delivered: {}\n- Delayed: {}",
        shipments.total,
        shipments.imports,
        shipments.exports,
        shipments.in_transit,
        shipments.delivered,
        shipments.delayed
    );

    let cloud = &dashboard.cloud;
    let _ = writeln!(output);
    let _ = writeln!(output, "## QC Cloud");
    let _ = writeln!(
        output,
        "- Active projects: {} of {}\n- Average quality: {}%",
        cloud.active_projects,
        cloud.total_projects,
        format::round_display(cloud.average_quality)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Inspections");

    let recent = recent_inspections(&dashboard.inspections, RECENT_INSPECTIONS);
    if recent.is_empty() {
        let _ = writeln!(output, "No inspections recorded.");
    } else {
        for inspection in recent {
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}% [{}]",
                inspection.item_name.as_deref().unwrap_or("Unnamed item"),
                format::display_label(&inspection.category),
                inspection.created_at.date_naive(),
                format::round_display(inspection.quality_score.unwrap_or(normalize::DEFAULT_SCORE)),
                status_label(inspection.status)
            );
        }
    }

    output
}

/// Newest first; inspections created at the same instant keep input order.
pub fn recent_inspections(inspections: &[InspectionRecord], limit: usize) -> Vec<&InspectionRecord> {
    let mut recent: Vec<&InspectionRecord> = inspections.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(limit);
    recent
}

fn status_label(status: Option<InspectionStatus>) -> &'static str {
    match status.unwrap_or(InspectionStatus::NeedsReview) {
        InspectionStatus::Pass => "Pass",
        InspectionStatus::Fail => "Fail",
        InspectionStatus::NeedsReview => "Review",
    }
}

/// One-paragraph drawback summary in the calculator's wording.
pub fn drawback_summary(import_value: f64, duty_rate_percent: f64) -> String {
    let estimate = crate::drawback::estimate(import_value, duty_rate_percent);
    if estimate.potential_drawback <= 0.0 {
        return "Enter a positive import value and duty rate to estimate a drawback.".to_string();
    }
    format!(
        "Total duties paid: {}\nPotential duty drawback: {}",
        format_usd(estimate.duties_paid),
        format_usd(estimate.potential_drawback)
    )
}
