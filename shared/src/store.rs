//! Event persistence against a single DynamoDB table.
//!
//! The table is keyed by `eventId` alone; attributes are otherwise
//! schema-less and the event schema is enforced at the HTTP boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Event, EventPatch, NewEvent};

/// Partition key attribute of the events table.
const KEY_ATTR: &str = "eventId";

/// Storage interface for event records, so the resource layer can run
/// against a substitute store in tests.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a record, assigning an id when the caller supplied none.
    /// An existing id is silently overwritten.
    async fn create(&self, new_event: NewEvent) -> Result<Event>;

    /// Point lookup by id; `None` when the id is unknown.
    async fn get(&self, event_id: &str) -> Result<Option<Event>>;

    /// Full-table scan, optionally narrowed to records whose `status`
    /// equals the filter exactly. Order is store-native.
    async fn list(&self, status_filter: Option<&str>) -> Result<Vec<Event>>;

    /// Apply a partial update and return the record as stored afterwards.
    /// Existence is the caller's pre-check; an unknown id grows a partial
    /// record, which this layer does not prevent.
    async fn update(&self, event_id: &str, patch: EventPatch) -> Result<Event>;

    /// Unconditional delete; deleting an unknown id still succeeds.
    async fn delete(&self, event_id: &str) -> Result<bool>;
}

/// DynamoDB-backed event store. Holds a single long-lived client handle,
/// safe for concurrent reuse across invocations.
#[derive(Debug, Clone)]
pub struct DynamoDbEventStore {
    client: Client,
    table_name: String,
}

impl DynamoDbEventStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a store from resolved configuration, honoring the endpoint
    /// override for a local DynamoDB.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.store_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self::new(Client::from_conf(builder.build()), config.table_name.clone())
    }
}

#[async_trait]
impl EventStore for DynamoDbEventStore {
    async fn create(&self, new_event: NewEvent) -> Result<Event> {
        let event = new_event.into_event();
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(&event)))
            .send()
            .await
            .map_err(|e| {
                Error::Store(format!("error creating event: {}", DisplayErrorContext(&e)))
            })?;
        debug!("stored event {}", event.event_id);
        Ok(event)
    }

    async fn get(&self, event_id: &str) -> Result<Option<Event>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTR, AttributeValue::S(event_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                Error::Store(format!("error getting event: {}", DisplayErrorContext(&e)))
            })?;
        output.item().map(from_item).transpose()
    }

    async fn list(&self, status_filter: Option<&str>) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        // Follow LastEvaluatedKey so the caller gets the whole table.
        loop {
            let mut scan = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take());
            if let Some(status) = status_filter {
                // `status` is a reserved word in DynamoDB expressions.
                scan = scan
                    .filter_expression("#status_attr = :status_val")
                    .expression_attribute_names("#status_attr", "status")
                    .expression_attribute_values(
                        ":status_val",
                        AttributeValue::S(status.to_string()),
                    );
            }
            let output = scan.send().await.map_err(|e| {
                Error::Store(format!("error listing events: {}", DisplayErrorContext(&e)))
            })?;
            for item in output.items() {
                events.push(from_item(item)?);
            }
            start_key = output.last_evaluated_key().cloned();
            if start_key.is_none() {
                break;
            }
        }
        Ok(events)
    }

    async fn update(&self, event_id: &str, patch: EventPatch) -> Result<Event> {
        if patch.is_empty() {
            // Nothing to change; hand back the stored record.
            return match self.get(event_id).await? {
                Some(event) => Ok(event),
                None => Err(Error::Store(format!(
                    "event '{event_id}' disappeared during update"
                ))),
            };
        }

        let (expression, names, values) = build_update_expression(&patch);
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTR, AttributeValue::S(event_id.to_string()))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                Error::Store(format!("error updating event: {}", DisplayErrorContext(&e)))
            })?;
        let attributes = output
            .attributes()
            .ok_or_else(|| Error::Store("update returned no attributes".to_string()))?;
        from_item(attributes)
    }

    async fn delete(&self, event_id: &str) -> Result<bool> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(KEY_ATTR, AttributeValue::S(event_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                Error::Store(format!("error deleting event: {}", DisplayErrorContext(&e)))
            })?;
        Ok(true)
    }
}

/// Build a `SET` update expression for exactly the fields the patch
/// touches. Every attribute name goes through a placeholder since
/// `status` and `date` are reserved words.
fn build_update_expression(
    patch: &EventPatch,
) -> (
    String,
    HashMap<String, String>,
    HashMap<String, AttributeValue>,
) {
    let mut fields: Vec<(&str, AttributeValue)> = Vec::new();
    if let Some(title) = &patch.title {
        fields.push(("title", AttributeValue::S(title.clone())));
    }
    if let Some(description) = &patch.description {
        fields.push(("description", AttributeValue::S(description.clone())));
    }
    if let Some(date) = &patch.date {
        fields.push(("date", AttributeValue::S(date.clone())));
    }
    if let Some(location) = &patch.location {
        fields.push(("location", AttributeValue::S(location.clone())));
    }
    if let Some(capacity) = patch.capacity {
        fields.push(("capacity", AttributeValue::N(capacity.to_string())));
    }
    if let Some(organizer) = &patch.organizer {
        fields.push(("organizer", AttributeValue::S(organizer.clone())));
    }
    if let Some(status) = &patch.status {
        fields.push(("status", AttributeValue::S(status.clone())));
    }

    let mut clauses = Vec::with_capacity(fields.len());
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    for (idx, (field, value)) in fields.into_iter().enumerate() {
        clauses.push(format!("#{field} = :val{idx}"));
        names.insert(format!("#{field}"), field.to_string());
        values.insert(format!(":val{idx}"), value);
    }
    (format!("SET {}", clauses.join(", ")), names, values)
}

fn to_item(event: &Event) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            KEY_ATTR.to_string(),
            AttributeValue::S(event.event_id.clone()),
        ),
        ("title".to_string(), AttributeValue::S(event.title.clone())),
        (
            "description".to_string(),
            AttributeValue::S(event.description.clone()),
        ),
        ("date".to_string(), AttributeValue::S(event.date.clone())),
        (
            "location".to_string(),
            AttributeValue::S(event.location.clone()),
        ),
        (
            "capacity".to_string(),
            AttributeValue::N(event.capacity.to_string()),
        ),
        (
            "organizer".to_string(),
            AttributeValue::S(event.organizer.clone()),
        ),
        (
            "status".to_string(),
            AttributeValue::S(event.status.clone()),
        ),
    ])
}

fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Event> {
    Ok(Event {
        event_id: string_attr(item, KEY_ATTR)?,
        title: string_attr(item, "title")?,
        description: string_attr(item, "description")?,
        date: string_attr(item, "date")?,
        location: string_attr(item, "location")?,
        capacity: number_attr(item, "capacity")?,
        organizer: string_attr(item, "organizer")?,
        status: string_attr(item, "status")?,
    })
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| Error::Store(format!("stored event is missing string attribute '{name}'")))
}

fn number_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<i64> {
    item.get(name)
        .and_then(|value| value.as_n().ok())
        .ok_or_else(|| Error::Store(format!("stored event is missing number attribute '{name}'")))?
        .parse()
        .map_err(|_| Error::Store(format!("stored event has a malformed '{name}' attribute")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            event_id: "evt-1".to_string(),
            title: "Meetup".to_string(),
            description: "desc".to_string(),
            date: "2025-01-01".to_string(),
            location: "Hall".to_string(),
            capacity: 50,
            organizer: "Alice".to_string(),
            status: "open".to_string(),
        }
    }

    #[test]
    fn test_item_round_trip() {
        let event = sample_event();
        let restored = from_item(&to_item(&event)).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn test_from_item_rejects_missing_attribute() {
        let mut item = to_item(&sample_event());
        item.remove("organizer");
        assert!(from_item(&item).is_err());
    }

    #[test]
    fn test_from_item_rejects_malformed_capacity() {
        let mut item = to_item(&sample_event());
        item.insert(
            "capacity".to_string(),
            AttributeValue::N("not-a-number".to_string()),
        );
        assert!(from_item(&item).is_err());
    }

    #[test]
    fn test_update_expression_single_field() {
        let patch = EventPatch {
            title: Some("New".to_string()),
            ..EventPatch::default()
        };
        let (expression, names, values) = build_update_expression(&patch);
        assert_eq!(expression, "SET #title = :val0");
        assert_eq!(names["#title"], "title");
        assert_eq!(values[":val0"], AttributeValue::S("New".to_string()));
    }

    #[test]
    fn test_update_expression_multiple_fields_in_declaration_order() {
        let patch = EventPatch {
            status: Some("closed".to_string()),
            capacity: Some(10),
            ..EventPatch::default()
        };
        let (expression, names, values) = build_update_expression(&patch);
        assert_eq!(expression, "SET #capacity = :val0, #status = :val1");
        assert_eq!(names.len(), 2);
        assert_eq!(values[":val0"], AttributeValue::N("10".to_string()));
        assert_eq!(values[":val1"], AttributeValue::S("closed".to_string()));
    }

    #[test]
    fn test_update_expression_touches_only_patched_fields() {
        let patch = EventPatch {
            description: Some("updated".to_string()),
            ..EventPatch::default()
        };
        let (expression, names, _) = build_update_expression(&patch);
        assert!(!expression.contains("#title"));
        assert!(!names.contains_key("#status"));
    }
}
