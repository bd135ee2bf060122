use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Snapshot;
use crate::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Inspection,
    Shipment,
    Project,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Inspection => "Inspection",
            Entity::Shipment => "Shipment",
            Entity::Project => "QCForgeProject",
        }
    }
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();

    let inspections = vec![
        ("seed-insp-001", "Oak dining chair", "furniture", 92, "pass", 0),
        ("seed-insp-002", "Walnut side table", "furniture", 64, "needs_review", 1),
        ("seed-insp-003", "Copper wire bale", "scrap_metal", 88, "pass", 1),
        ("seed-insp-004", "Kraft pulp lot 17", "pulp_paper", 41, "fail", 3),
        ("seed-insp-005", "Denim jackets", "apparel", 77, "pass", 4),
        ("seed-insp-006", "Aluminium cans", "scrap_metal", 81, "pass", 6),
        ("seed-insp-007", "Pine bookshelf", "furniture", 58, "needs_review", 9),
    ];

    for (id, item_name, industry_type, score, status, days_ago) in inspections {
        let created_at = now - Duration::days(days_ago);
        let payload = json!({
            "id": id,
            "item_name": item_name,
            "industry_type": industry_type,
            "created_date": created_at.to_rfc3339(),
            "ai_analysis": { "quality_score": score, "overall_status": status },
        });
        upsert(pool, Entity::Inspection, id, &payload, created_at).await?;
    }

    let shipments = vec![
        ("seed-shp-001", "SHP-2026-001", "import", "in_transit", "Shenzhen", "Los Angeles", "Maersk"),
        ("seed-shp-002", "SHP-2026-002", "export", "delivered", "Savannah", "Rotterdam", "MSC"),
        ("seed-shp-003", "SHP-2026-003", "import", "delayed", "Ho Chi Minh City", "Long Beach", "CMA CGM"),
        ("seed-shp-004", "SHP-2026-004", "export", "customs", "Houston", "Santos", "Hapag-Lloyd"),
    ];

    for (id, shipment_id, kind, status, origin, destination, carrier) in shipments {
        let payload = json!({
            "id": id,
            "shipment_id": shipment_id,
            "type": kind,
            "status": status,
            "origin": origin,
            "destination": destination,
            "carrier": carrier,
        });
        upsert(pool, Entity::Shipment, id, &payload, now).await?;
    }

    let projects = vec![
        ("seed-prj-001", "Furniture line QC", "active"),
        ("seed-prj-002", "Scrap intake grading", "paused"),
    ];

    for (id, project_name, status) in projects {
        let payload = json!({
            "id": id,
            "project_name": project_name,
            "components_used": [
                { "name": "defect-detection", "status": status },
                { "name": "document-ocr", "status": "paused" },
            ],
        });
        upsert(pool, Entity::Project, id, &payload, now).await?;
    }

    info!("seeded inspections, shipments and projects");
    Ok(())
}

async fn upsert(
    pool: &PgPool,
    entity: Entity,
    id: &str,
    payload: &Value,
    created_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO qcforge.entity_records (entity, id, payload, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (entity, id) DO UPDATE
        SET payload = EXCLUDED.payload, created_at = EXCLUDED.created_at
        "#,
    )
    .bind(entity.as_str())
    .bind(id)
    .bind(payload)
    .bind(created_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to upsert {} {id}", entity.as_str()))?;
    Ok(())
}

/// Payloads of one entity kind, newest first.
pub async fn fetch_entities(
    pool: &PgPool,
    entity: Entity,
    since: Option<DateTime<Utc>>,
) -> anyhow::Result<Vec<Value>> {
    let mut query = String::from(
        "SELECT payload FROM qcforge.entity_records WHERE entity = $1",
    );
    if since.is_some() {
        query.push_str(" AND created_at >= $2");
    }
    query.push_str(" ORDER BY created_at DESC");

    let mut rows = sqlx::query(&query).bind(entity.as_str());
    if let Some(value) = since {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut payloads = Vec::with_capacity(records.len());
    for row in records {
        payloads.push(row.try_get::<Value, _>("payload")?);
    }

    debug!(entity = entity.as_str(), count = payloads.len(), "fetched entity records");
    Ok(payloads)
}

/// Inspections created since `since`, plus every shipment and project.
pub async fn fetch_snapshot(pool: &PgPool, since: DateTime<Utc>) -> anyhow::Result<Snapshot> {
    Ok(Snapshot {
        inspections: fetch_entities(pool, Entity::Inspection, Some(since)).await?,
        shipments: fetch_entities(pool, Entity::Shipment, None).await?,
        projects: fetch_entities(pool, Entity::Project, None).await?,
    })
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: Option<String>,
    item_name: String,
    industry_type: String,
    quality_score: Option<f64>,
    overall_status: Option<String>,
    created_date: String,
}

fn csv_payload(row: &CsvRow, id: &str) -> Value {
    let mut analysis = serde_json::Map::new();
    if let Some(score) = row.quality_score {
        analysis.insert("quality_score".to_string(), json!(score));
    }
    if let Some(status) = row.overall_status.as_deref().filter(|s| !s.is_empty()) {
        analysis.insert("overall_status".to_string(), json!(status));
    }

    json!({
        "id": id,
        "item_name": row.item_name,
        "industry_type": row.industry_type,
        "created_date": row.created_date,
        "ai_analysis": analysis,
    })
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let created_at = normalize::parse_timestamp(&row.created_date).with_context(|| {
            format!("row {}: unreadable created_date {:?}", line + 1, row.created_date)
        })?;

        let id = row
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        let payload = csv_payload(&row, &id);

        let result = sqlx::query(
            r#"
            INSERT INTO qcforge.entity_records (entity, id, payload, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (entity, id) DO NOTHING
            "#,
        )
        .bind(Entity::Inspection.as_str())
        .bind(&id)
        .bind(&payload)
        .bind(created_at)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            debug!(id = %id, "skipped duplicate inspection");
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InspectionStatus;

    #[test]
    fn csv_rows_become_backend_payloads() {
        let row = CsvRow {
            id: None,
            item_name: "Oak chair".to_string(),
            industry_type: "furniture".to_string(),
            quality_score: Some(81.0),
            overall_status: Some("pass".to_string()),
            created_date: "2026-03-04T10:00:00".to_string(),
        };
        let payload = csv_payload(&row, "import-1");
        let inspection = normalize::inspection_from_value(0, &payload).unwrap();
        assert_eq!(inspection.id, "import-1");
        assert_eq!(inspection.quality_score, Some(81.0));
        assert_eq!(inspection.status, Some(InspectionStatus::Pass));
    }

    #[test]
    fn csv_rows_without_score_stay_sparse() {
        let row = CsvRow {
            id: Some("x".to_string()),
            item_name: "Pulp bale".to_string(),
            industry_type: "pulp_paper".to_string(),
            quality_score: None,
            overall_status: Some(String::new()),
            created_date: "2026-03-04".to_string(),
        };
        let inspection = normalize::inspection_from_value(0, &csv_payload(&row, "x")).unwrap();
        assert_eq!(inspection.quality_score, None);
        assert_eq!(inspection.status, None);
    }

    #[test]
    fn entity_names_match_backend() {
        assert_eq!(Entity::Inspection.as_str(), "Inspection");
        assert_eq!(Entity::Project.as_str(), "QCForgeProject");
    }
}
