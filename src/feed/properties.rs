//! Allow-listed property projection for activity entries.

use crate::models::EventRecord;

/// Maximum number of properties shown per event.
pub const MAX_DISPLAYED_PROPERTIES: usize = 5;

/// Property keys eligible for display.
pub const DISPLAY_ALLOW_LIST: [&str; 24] = [
    "Recipient Email Address",
    "Recipient Email",
    "Campaign Name",
    "Subject",
    "Inbox Provider",
    "machine_open",
    "email_address",
    "Source Name",
    "ShippingRate",
    "FulfillmentStatus",
    "FulfillmentHours",
    "browser",
    "os",
    "method_detail",
    "method",
    "subject",
    "from",
    "Name",
    "Price",
    "CollectionName",
    "CollectionID",
    "Variant Name",
    "Vendor",
    "Items",
];

/// Whether `key` may be displayed.
pub fn is_displayable(key: &str) -> bool {
    DISPLAY_ALLOW_LIST.contains(&key)
}

/// Allow-listed properties of `record` with their rendered values.
///
/// Keeps the record's own property order and stops after
/// [`MAX_DISPLAYED_PROPERTIES`] entries.
pub fn display_properties(record: &EventRecord) -> Vec<(&str, String)> {
    record
        .properties
        .iter()
        .filter(|(key, _)| is_displayable(key))
        .take(MAX_DISPLAYED_PROPERTIES)
        .map(|(key, value)| (key.as_str(), value.to_string()))
        .collect()
}

/// Human label for a property key (`machine_open` -> `machine open`).
pub fn display_label(key: &str) -> String {
    key.replace('_', " ")
}
