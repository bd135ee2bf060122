//! Record normalization.
//!
//! Backend payloads are loosely shaped: the score lives under an optional
//! `ai_analysis` object and any level may be missing. Everything here turns
//! those payloads into [`InspectionRecord`]s and then into
//! [`NormalizedRecord`]s, defaulting what may be absent and rejecting the
//! batch on anything that cannot be read.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::models::{InspectionRecord, InspectionStatus, NormalizedRecord};

/// Score used when a record carries none.
pub const DEFAULT_SCORE: f64 = 0.0;

pub fn normalize(records: &[InspectionRecord]) -> Result<Vec<NormalizedRecord>> {
    let mut defaulted = 0usize;
    let mut normalized = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let score = match record.quality_score {
            Some(score) if !score.is_finite() => {
                return Err(AnalyticsError::invalid(
                    index,
                    Some(&record.id),
                    format!("quality score {score} is not a finite number"),
                ));
            }
            Some(score) => score,
            None => {
                defaulted += 1;
                DEFAULT_SCORE
            }
        };

        normalized.push(NormalizedRecord {
            created_at: record.created_at,
            category: record.category.clone(),
            score,
        });
    }

    debug!(
        records = normalized.len(),
        defaulted, "normalized inspection records"
    );
    Ok(normalized)
}

/// Reads a batch of raw inspection payloads. The first unreadable record
/// fails the whole batch.
pub fn inspections_from_values(values: &[Value]) -> Result<Vec<InspectionRecord>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| inspection_from_value(index, value))
        .collect()
}

pub fn inspection_from_value(index: usize, value: &Value) -> Result<InspectionRecord> {
    let object = value
        .as_object()
        .ok_or_else(|| AnalyticsError::invalid(index, None, "record is not a JSON object"))?;

    let id = read_id(object);

    let created_at = match object.get("created_date").or_else(|| object.get("created_at")) {
        Some(Value::String(raw)) => parse_timestamp(raw).ok_or_else(|| {
            AnalyticsError::invalid(index, id.as_deref(), format!("unreadable created_date {raw:?}"))
        })?,
        _ => {
            return Err(AnalyticsError::invalid(
                index,
                id.as_deref(),
                "missing created_date",
            ))
        }
    };

    let category = match object.get("industry_type") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(category)) => category.clone(),
        Some(other) => {
            return Err(AnalyticsError::invalid(
                index,
                id.as_deref(),
                format!("industry_type must be a string, got {other}"),
            ))
        }
    };

    let analysis = object.get("ai_analysis").and_then(Value::as_object);
    let quality_score = read_score(analysis).map_err(|reason| {
        AnalyticsError::invalid(index, id.as_deref(), reason)
    })?;
    let status = analysis
        .and_then(|analysis| analysis.get("overall_status"))
        .and_then(Value::as_str)
        .and_then(parse_status);

    let item_name = object
        .get("item_name")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(InspectionRecord {
        id: id.unwrap_or_default(),
        created_at,
        category,
        quality_score,
        status,
        item_name,
    })
}

/// Accepts RFC 3339 instants, naive date-times (taken as UTC) and bare dates
/// (midnight UTC). The backend emits the naive form.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn parse_status(raw: &str) -> Option<InspectionStatus> {
    match raw {
        "pass" => Some(InspectionStatus::Pass),
        "fail" => Some(InspectionStatus::Fail),
        "needs_review" => Some(InspectionStatus::NeedsReview),
        _ => None,
    }
}

fn read_id(object: &Map<String, Value>) -> Option<String> {
    match object.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

// A null score behaves like a missing one.
fn read_score(analysis: Option<&Map<String, Value>>) -> std::result::Result<Option<f64>, String> {
    match analysis.and_then(|analysis| analysis.get("quality_score")) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|score| score.is_finite())
            .map(Some)
            .ok_or_else(|| format!("quality score {number} is not a finite number")),
        Some(other) => Err(format!("quality score must be a number, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(id: &str, score: Option<f64>) -> InspectionRecord {
        InspectionRecord {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap(),
            category: "furniture".to_string(),
            quality_score: score,
            status: None,
            item_name: None,
        }
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let normalized = normalize(&[record("a", None), record("b", Some(72.5))]).unwrap();
        assert_eq!(normalized[0].score, 0.0);
        assert_eq!(normalized[1].score, 72.5);
    }

    #[test]
    fn non_finite_score_rejects_batch() {
        let err = normalize(&[record("a", Some(50.0)), record("b", Some(f64::NAN))]).unwrap_err();
        match err {
            AnalyticsError::InvalidRecord { index, id, .. } => {
                assert_eq!(index, 1);
                assert_eq!(id, "b");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn out_of_range_scores_pass_through() {
        let normalized = normalize(&[record("a", Some(140.0)), record("b", Some(-5.0))]).unwrap();
        assert_eq!(normalized[0].score, 140.0);
        assert_eq!(normalized[1].score, -5.0);
    }

    #[test]
    fn reads_nested_backend_payload() {
        let value = json!({
            "id": "insp-1",
            "created_date": "2026-03-04T09:15:00.123000",
            "industry_type": "scrap_metal",
            "item_name": "Copper coil",
            "ai_analysis": { "quality_score": 88, "overall_status": "pass" }
        });
        let inspection = inspection_from_value(0, &value).unwrap();
        assert_eq!(inspection.id, "insp-1");
        assert_eq!(inspection.category, "scrap_metal");
        assert_eq!(inspection.quality_score, Some(88.0));
        assert_eq!(inspection.status, Some(InspectionStatus::Pass));
        assert_eq!(inspection.item_name.as_deref(), Some("Copper coil"));
        assert_eq!(
            inspection.created_at,
            Utc.with_ymd_and_hms(2026, 3, 4, 9, 15, 0).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn tolerates_missing_analysis_and_category() {
        let values = vec![
            json!({ "id": "a", "created_date": "2026-03-04" }),
            json!({ "id": "b", "created_date": "2026-03-04", "ai_analysis": {} }),
            json!({ "id": "c", "created_date": "2026-03-04", "ai_analysis": { "quality_score": null } }),
        ];
        let inspections = inspections_from_values(&values).unwrap();
        assert!(inspections.iter().all(|i| i.quality_score.is_none()));
        assert!(inspections.iter().all(|i| i.category.is_empty()));
    }

    #[test]
    fn string_score_is_invalid() {
        let values = vec![
            json!({ "id": "a", "created_date": "2026-03-04", "ai_analysis": { "quality_score": 90 } }),
            json!({ "id": "b", "created_date": "2026-03-04", "ai_analysis": { "quality_score": "high" } }),
        ];
        let err = inspections_from_values(&values).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn non_object_and_missing_date_are_invalid() {
        assert!(inspection_from_value(0, &json!([1, 2])).is_err());
        assert!(inspection_from_value(0, &json!({ "id": "x" })).is_err());
        assert!(inspection_from_value(0, &json!({ "id": "x", "created_date": "yesterday" })).is_err());
    }

    #[test]
    fn parses_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2026-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-01-02 03:04:05"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-01-02"),
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("not a date"), None);
    }
}
