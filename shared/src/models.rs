//! Event data models and request payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A fully populated event record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: String,
    pub title: String,
    pub description: String,
    /// ISO-8601 by convention; stored and returned as opaque text
    pub date: String,
    pub location: String,
    pub capacity: i64,
    pub organizer: String,
    pub status: String,
}

/// Payload for `POST /events`.
///
/// Required fields are `Option` at the serde layer so a missing field
/// surfaces as a per-field `required` violation instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "field is required"),
        length(min = 1, max = 200, message = "must be between 1 and 200 characters")
    )]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "field is required"),
        length(max = 1000, message = "must be at most 1000 characters")
    )]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(required(message = "field is required"))]
    pub date: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "field is required"),
        length(min = 1, max = 200, message = "must be between 1 and 200 characters")
    )]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "field is required"),
        range(min = 1, message = "must be greater than 0")
    )]
    pub capacity: Option<i64>,
    #[serde(default)]
    #[validate(
        required(message = "field is required"),
        length(min = 1, max = 100, message = "must be between 1 and 100 characters")
    )]
    pub organizer: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "field is required"),
        length(min = 1, max = 50, message = "must be between 1 and 50 characters")
    )]
    pub status: Option<String>,
}

impl CreateEventRequest {
    /// Collapse into creation data. Yields `None` only if a required field
    /// is missing, which validation has already ruled out.
    pub fn into_new_event(self) -> Option<NewEvent> {
        Some(NewEvent {
            event_id: self.event_id,
            title: self.title?,
            description: self.description?,
            date: self.date?,
            location: self.location?,
            capacity: self.capacity?,
            organizer: self.organizer?,
            status: self.status?,
        })
    }
}

/// A validated event awaiting persistence, id still optional.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_id: Option<String>,
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub capacity: i64,
    pub organizer: String,
    pub status: String,
}

impl NewEvent {
    /// Resolve to a stored record, generating an id when the caller
    /// supplied none (a blank id counts as none).
    pub fn into_event(self) -> Event {
        let event_id = match self.event_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        Event {
            event_id,
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            capacity: self.capacity,
            organizer: self.organizer,
            status: self.status,
        }
    }
}

/// Payload for `PUT /events/{id}`.
///
/// Fields absent from the payload and fields explicitly set to null are
/// both left unchanged; there is no way to clear a field. The double
/// `Option` keeps the two cases apart: only a payload naming zero fields
/// is rejected as empty.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: Option<Option<String>>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub date: Option<Option<String>>,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub location: Option<Option<String>>,
    #[serde(default)]
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub capacity: Option<Option<i64>>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub organizer: Option<Option<String>>,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub status: Option<Option<String>>,
}

impl UpdateEventRequest {
    /// True when the payload named no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.organizer.is_none()
            && self.status.is_none()
    }

    /// Collapse into the concrete set of changes; null-valued fields
    /// fall away here.
    pub fn into_patch(self) -> EventPatch {
        EventPatch {
            title: self.title.flatten(),
            description: self.description.flatten(),
            date: self.date.flatten(),
            location: self.location.flatten(),
            capacity: self.capacity.flatten(),
            organizer: self.organizer.flatten(),
            status: self.status.flatten(),
        }
    }
}

/// Concrete field changes to apply to a stored event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i64>,
    pub organizer: Option<String>,
    pub status: Option<String>,
}

impl EventPatch {
    /// True when no field changes remain.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.organizer.is_none()
            && self.status.is_none()
    }

    /// Apply the changes to a record in place.
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(date) = &self.date {
            event.date = date.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(organizer) = &self.organizer {
            event.organizer = organizer.clone();
        }
        if let Some(status) = &self.status {
            event.status = status.clone();
        }
    }
}
