use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Pass,
    Fail,
    NeedsReview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Industry type. Free text; may be empty.
    pub category: String,
    pub quality_score: Option<f64>,
    pub status: Option<InspectionStatus>,
    pub item_name: Option<String>,
}

/// Uniform `(timestamp, category, score)` view of an inspection, with the
/// score already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub created_at: DateTime<Utc>,
    pub category: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRollup {
    pub category: String,
    pub count: usize,
    pub average_score: f64,
    pub display_order: usize,
    /// Position of the category's first record in the input.
    pub first_seen: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRollup {
    pub date: NaiveDate,
    pub count: usize,
    /// Zero on days without records; check `count` before reading it as data.
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentKind {
    Import,
    Export,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Customs,
    Delivered,
    Delayed,
    Cancelled,
    #[default]
    #[serde(other)]
    Other,
}

/// Missing and `null` both fall back to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipment_id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: ShipmentKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ShipmentStatus,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentUsage {
    #[serde(default, alias = "component_name", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components_used: Vec<ComponentUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShipmentStats {
    pub total: usize,
    pub in_transit: usize,
    pub delivered: usize,
    pub delayed: usize,
    pub imports: usize,
    pub exports: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CloudStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_inspections: usize,
    pub average_quality: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub needs_review: usize,
}

/// Raw entity collections as exported from the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub inspections: Vec<Value>,
    #[serde(default)]
    pub shipments: Vec<Value>,
    #[serde(default)]
    pub projects: Vec<Value>,
}
