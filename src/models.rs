//! Data models for profile events and orders.
//!
//! The backend returns JSON-API style objects with the interesting fields
//! nested a few levels deep. The wire shapes are private; the rest of the
//! crate works with the flattened records defined here.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Category used when an event carries no metric name.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Property key holding an event's headline value.
pub const VALUE_PROPERTY: &str = "$value";

/// Event or order properties, in the order the server sent them.
pub type Properties = IndexMap<String, PropertyValue>;

/// A single property value as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<Value>),
    Object(serde_json::Map<String, Value>),
}

impl PropertyValue {
    /// Whether the value counts as "set" for display purposes.
    ///
    /// Null, `false`, zero and the empty string are unset; lists and
    /// objects are always set, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Null => false,
            PropertyValue::Bool(b) => *b,
            PropertyValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            PropertyValue::Text(s) => !s.is_empty(),
            PropertyValue::List(_) | PropertyValue::Object(_) => true,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "N/A"),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => write!(f, "{}", format_number(n)),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::List(items) if items.is_empty() => write!(f, "None"),
            PropertyValue::List(items) => {
                let joined: Vec<String> = items.iter().map(list_item_text).collect();
                write!(f, "{}", joined.join(", "))
            }
            PropertyValue::Object(map) => {
                write!(f, "{}", serde_json::to_string(map).unwrap_or_default())
            }
        }
    }
}

/// Whole floats print without a trailing `.0`.
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        _ => n.to_string(),
    }
}

fn list_item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Deserialize `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Event ids arrive as strings or bare numbers; anything else is dropped.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// One entry of a profile's activity log.
///
/// Serializes back to the backend's nested shape, so records survive a
/// round-trip through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent", into = "RawEvent")]
pub struct EventRecord {
    /// Server-side identifier; absent records are known by position only.
    pub id: Option<String>,
    /// When the event happened, if the server sent a usable timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    /// Metric name, or [`UNKNOWN_CATEGORY`].
    pub category: String,
    pub properties: Properties,
}

impl EventRecord {
    pub fn new(category: impl Into<String>, properties: Properties) -> Self {
        Self {
            id: None,
            timestamp: None,
            category: category.into(),
            properties,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The `$value` property, when it is set.
    pub fn headline_value(&self) -> Option<&PropertyValue> {
        self.properties
            .get(VALUE_PROPERTY)
            .filter(|value| value.is_truthy())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawEvent {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    attributes: Option<RawEventAttributes>,
    #[serde(default)]
    relationships: Option<RawRelationships>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawEventAttributes {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    event_properties: Option<Properties>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawRelationships {
    #[serde(default)]
    metric: Option<RawMetric>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawMetric {
    #[serde(default)]
    data: Option<RawMetricData>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawMetricData {
    #[serde(default)]
    name: Option<String>,
}

impl From<RawEvent> for EventRecord {
    fn from(raw: RawEvent) -> Self {
        let category = raw
            .relationships
            .and_then(|r| r.metric)
            .and_then(|m| m.data)
            .and_then(|d| d.name)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        let attributes = raw.attributes.unwrap_or_default();

        Self {
            id: raw.id,
            timestamp: attributes.datetime.as_deref().and_then(parse_timestamp),
            category,
            properties: attributes.event_properties.unwrap_or_default(),
        }
    }
}

impl From<EventRecord> for RawEvent {
    fn from(record: EventRecord) -> Self {
        Self {
            id: record.id,
            attributes: Some(RawEventAttributes {
                datetime: record.timestamp.map(|ts| ts.to_rfc3339()),
                event_properties: Some(record.properties),
            }),
            relationships: Some(RawRelationships {
                metric: Some(RawMetric {
                    data: Some(RawMetricData {
                        name: Some(record.category),
                    }),
                }),
            }),
        }
    }
}

/// One page of events, as returned by the events endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<EventRecord>,
    /// Total number of events the server holds for the subject.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_records: usize,
}

/// One past order from a profile's order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default)]
    pub event_datetime: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_properties: Properties,
}

/// Response of the order-history endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderHistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<OrderHistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderHistoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_history: Vec<OrderRecord>,
}

impl OrderHistoryResponse {
    /// Orders of the first entry; the backend only ever fills that one.
    pub fn into_orders(self) -> Vec<OrderRecord> {
        self.data
            .into_iter()
            .next()
            .map(|entry| entry.order_history)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_from_nested_json() {
        let record: EventRecord = serde_json::from_value(json!({
            "id": "evt_1",
            "attributes": {
                "datetime": "2025-03-04T10:15:00+00:00",
                "event_properties": {
                    "Subject": "Spring sale",
                    "Campaign Name": "March",
                    "$value": 12.5
                }
            },
            "relationships": { "metric": { "data": { "name": "Opened Email" } } }
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("evt_1"));
        assert_eq!(record.category, "Opened Email");
        assert_eq!(
            record.timestamp.map(|t| t.to_rfc3339()),
            Some("2025-03-04T10:15:00+00:00".to_string())
        );
        let keys: Vec<&str> = record.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Subject", "Campaign Name", "$value"]);
        assert_eq!(record.headline_value().map(|v| v.to_string()), Some("12.5".to_string()));
    }

    #[test]
    fn test_missing_metric_is_unknown() {
        let record: EventRecord = serde_json::from_value(json!({
            "attributes": { "event_properties": {} },
            "relationships": { "metric": { "data": null } }
        }))
        .unwrap();
        assert_eq!(record.category, UNKNOWN_CATEGORY);
        assert!(record.timestamp.is_none());

        let bare: EventRecord = serde_json::from_value(json!({})).unwrap();
        assert!(bare.id.is_none());
        assert_eq!(bare.category, UNKNOWN_CATEGORY);
        assert!(bare.properties.is_empty());
    }

    #[test]
    fn test_numeric_id_kept_as_string() {
        let record: EventRecord = serde_json::from_value(json!({ "id": 1042 })).unwrap();
        assert_eq!(record.id.as_deref(), Some("1042"));
    }

    #[test]
    fn test_event_page_json_round_trip() {
        let properties: Properties =
            serde_json::from_value(json!({ "Items": "Widget", "$value": 9.5 })).unwrap();
        let page = EventPage {
            data: vec![EventRecord::new("Placed Order", properties)
                .with_id("evt_9")
                .with_timestamp(parse_timestamp("2025-03-04T10:15:00Z").unwrap())],
            total_records: 1,
        };

        let json = serde_json::to_string(&page).unwrap();
        let back: EventPage = serde_json::from_str(&json).unwrap();

        assert_eq!(back.total_records, 1);
        assert_eq!(back.data, page.data);
        assert!(json.contains(r#""metric":{"data":{"name":"Placed Order"}}"#));
    }

    #[test]
    fn test_null_page_fields_default() {
        let page: EventPage =
            serde_json::from_value(json!({ "data": null, "total_records": null })).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_records, 0);

        let response: OrderHistoryResponse =
            serde_json::from_value(json!({ "data": [{ "order_history": null }] })).unwrap();
        assert!(response.into_orders().is_empty());

        let order: OrderRecord = serde_json::from_value(json!({
            "event_datetime": null,
            "event_properties": null
        }))
        .unwrap();
        assert!(order.event_properties.is_empty());
    }

    #[test]
    fn test_property_value_rendering() {
        let values: Properties = serde_json::from_value(json!({
            "list": ["a", "b"],
            "empty": [],
            "null": null,
            "int": 3,
            "float": 2.0,
            "flag": true,
            "text": "hello"
        }))
        .unwrap();

        assert_eq!(values["list"].to_string(), "a, b");
        assert_eq!(values["empty"].to_string(), "None");
        assert_eq!(values["null"].to_string(), "N/A");
        assert_eq!(values["int"].to_string(), "3");
        assert_eq!(values["float"].to_string(), "2");
        assert_eq!(values["flag"].to_string(), "true");
        assert_eq!(values["text"].to_string(), "hello");
    }

    #[test]
    fn test_truthiness() {
        assert!(!PropertyValue::Null.is_truthy());
        assert!(!PropertyValue::Text(String::new()).is_truthy());
        assert!(!PropertyValue::Number(0.into()).is_truthy());
        assert!(PropertyValue::List(vec![]).is_truthy());
        assert!(PropertyValue::Text("x".to_string()).is_truthy());
    }

    #[test]
    fn test_parse_naive_timestamp() {
        let ts = parse_timestamp("2024-12-01T08:00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-12-01T08:00:00+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_order_history_first_entry() {
        let response: OrderHistoryResponse = serde_json::from_value(json!({
            "data": [
                { "order_history": [
                    { "event_datetime": "2025-01-01T00:00:00Z",
                      "event_properties": { "Items": "Widget" } }
                ] },
                { "order_history": [] }
            ]
        }))
        .unwrap();

        let orders = response.into_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(
            orders[0].event_properties.get("Items"),
            Some(&PropertyValue::Text("Widget".to_string()))
        );

        assert!(OrderHistoryResponse::default().into_orders().is_empty());
    }
}
