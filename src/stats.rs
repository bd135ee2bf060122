use serde_json::Value;

use crate::error::{AnalyticsError, Result};
use crate::models::{
    CloudStats, InspectionRecord, InspectionStatus, NormalizedRecord, ProjectRecord,
    ShipmentKind, ShipmentRecord, ShipmentStats, ShipmentStatus, StatusCounts,
};
use crate::rollup;

pub fn shipment_stats(shipments: &[ShipmentRecord]) -> ShipmentStats {
    let mut stats = ShipmentStats {
        total: shipments.len(),
        ..ShipmentStats::default()
    };

    for shipment in shipments {
        match shipment.status {
            ShipmentStatus::InTransit => stats.in_transit += 1,
            ShipmentStatus::Delivered => stats.delivered += 1,
            ShipmentStatus::Delayed => stats.delayed += 1,
            _ => {}
        }
        match shipment.kind {
            ShipmentKind::Import => stats.imports += 1,
            ShipmentKind::Export => stats.exports += 1,
            ShipmentKind::Other => {}
        }
    }

    stats
}

/// A project counts as active when any of its components is running.
pub fn is_active_project(project: &ProjectRecord) -> bool {
    project
        .components_used
        .iter()
        .any(|component| component.status == "active")
}

pub fn cloud_stats(projects: &[ProjectRecord], inspections: &[NormalizedRecord]) -> CloudStats {
    CloudStats {
        total_projects: projects.len(),
        active_projects: projects.iter().filter(|p| is_active_project(p)).count(),
        total_inspections: inspections.len(),
        average_quality: rollup::average_score(inspections),
    }
}

/// Inspections without a verdict are counted as awaiting review.
pub fn status_counts(inspections: &[InspectionRecord]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for inspection in inspections {
        match inspection.status.unwrap_or(InspectionStatus::NeedsReview) {
            InspectionStatus::Pass => counts.pass += 1,
            InspectionStatus::Fail => counts.fail += 1,
            InspectionStatus::NeedsReview => counts.needs_review += 1,
        }
    }
    counts
}

pub fn shipments_from_values(values: &[Value]) -> Result<Vec<ShipmentRecord>> {
    decode_all(values)
}

pub fn projects_from_values(values: &[Value]) -> Result<Vec<ProjectRecord>> {
    decode_all(values)
}

fn decode_all<T: serde::de::DeserializeOwned>(values: &[Value]) -> Result<Vec<T>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value.clone()).map_err(|err| {
                let id = value.get("id").and_then(Value::as_str);
                AnalyticsError::invalid(index, id, err.to_string())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn shipment(kind: ShipmentKind, status: ShipmentStatus) -> ShipmentRecord {
        ShipmentRecord {
            id: "s".to_string(),
            shipment_id: "SHP-1".to_string(),
            kind,
            status,
            origin: None,
            destination: None,
            carrier: None,
        }
    }

    #[test]
    fn counts_shipments_by_status_and_direction() {
        let shipments = vec![
            shipment(ShipmentKind::Import, ShipmentStatus::InTransit),
            shipment(ShipmentKind::Import, ShipmentStatus::Delivered),
            shipment(ShipmentKind::Export, ShipmentStatus::Delayed),
            shipment(ShipmentKind::Export, ShipmentStatus::Customs),
            shipment(ShipmentKind::Import, ShipmentStatus::InTransit),
        ];
        assert_eq!(
            shipment_stats(&shipments),
            ShipmentStats {
                total: 5,
                in_transit: 2,
                delivered: 1,
                delayed: 1,
                imports: 3,
                exports: 2,
            }
        );
        assert_eq!(shipment_stats(&[]), ShipmentStats::default());
    }

    #[test]
    fn decodes_backend_shipments() {
        let values = vec![
            json!({ "id": "1", "shipment_id": "SHP-001", "type": "import", "status": "in_transit", "carrier": "Maersk" }),
            json!({ "id": "2", "shipment_id": "SHP-002", "type": "export", "status": "on_hold" }),
        ];
        let shipments = shipments_from_values(&values).unwrap();
        assert_eq!(shipments[0].status, ShipmentStatus::InTransit);
        assert_eq!(shipments[1].status, ShipmentStatus::Other);
        assert_eq!(shipments[1].kind, ShipmentKind::Export);
    }

    #[test]
    fn sparse_shipments_count_only_in_total() {
        let values = vec![
            json!({ "id": "s1", "type": "import" }),
            json!({ "id": "s2", "status": "delivered" }),
            json!({ "id": "s3", "type": null, "status": null }),
            json!({ "id": "s4", "type": "re_export", "status": "in_transit" }),
        ];
        let shipments = shipments_from_values(&values).unwrap();
        assert_eq!(shipments[0].status, ShipmentStatus::Other);
        assert_eq!(shipments[1].kind, ShipmentKind::Other);
        assert_eq!(shipments[3].kind, ShipmentKind::Other);
        assert_eq!(
            shipment_stats(&shipments),
            ShipmentStats {
                total: 4,
                in_transit: 1,
                delivered: 1,
                delayed: 0,
                imports: 1,
                exports: 0,
            }
        );
    }

    #[test]
    fn null_components_mean_inactive_project() {
        let projects = projects_from_values(&[
            json!({ "id": "p1", "project_name": "Line A", "components_used": null }),
        ])
        .unwrap();
        assert!(projects[0].components_used.is_empty());
        assert!(!is_active_project(&projects[0]));
    }

    #[test]
    fn rejects_shipment_that_is_not_an_object() {
        assert!(matches!(
            shipments_from_values(&[json!("SHP-1")]),
            Err(AnalyticsError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn cloud_stats_count_active_projects() {
        let projects = projects_from_values(&[
            json!({ "id": "p1", "project_name": "Line A", "components_used": [
                { "name": "defect-detector", "status": "active" },
                { "name": "ocr", "status": "paused" }
            ]}),
            json!({ "id": "p2", "project_name": "Line B", "components_used": [
                { "name": "ocr", "status": "paused" }
            ]}),
            json!({ "id": "p3", "project_name": "Line C" }),
        ])
        .unwrap();
        let inspections = vec![
            NormalizedRecord {
                created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                category: "apparel".to_string(),
                score: 90.0,
            },
            NormalizedRecord {
                created_at: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
                category: "apparel".to_string(),
                score: 80.0,
            },
        ];

        let stats = cloud_stats(&projects, &inspections);
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.total_inspections, 2);
        assert_eq!(stats.average_quality, 85.0);
    }

    #[test]
    fn missing_status_counts_as_review() {
        let base = InspectionRecord {
            id: "i".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            category: "apparel".to_string(),
            quality_score: None,
            status: None,
            item_name: None,
        };
        let inspections = vec![
            InspectionRecord { status: Some(InspectionStatus::Pass), ..base.clone() },
            InspectionRecord { status: Some(InspectionStatus::Fail), ..base.clone() },
            InspectionRecord { status: Some(InspectionStatus::Pass), ..base.clone() },
            base,
        ];
        assert_eq!(
            status_counts(&inspections),
            StatusCounts { pass: 2, fail: 1, needs_review: 1 }
        );
    }
}
