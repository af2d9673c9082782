//! Type -> parser registry and the parsing entry points.

use crate::errors::EventError;
use crate::event::{Event, EventType, SensorEvent};
use crate::parsers::{parse_window, parse_window_location};
use crate::validation::{validate_envelope, Object};
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Typed parser. Receives the raw object and the identity-stamped envelope.
pub type ParseFn = fn(&Object, SensorEvent) -> Result<Event, EventError>;

/// Registered event parsers keyed by wire type name.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<&'static str, ParseFn>,
}

impl ParserRegistry {
    /// Registry with no parsers. Every event parses as `Unknown`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the sensor event types the gateway understands.
    ///
    /// `Install` is deliberately absent: it is only ever generated by the
    /// gateway, so a sensor-supplied `Install` parses as `Unknown`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(EventType::Window, parse_window);
        registry.register(EventType::WindowLocation, parse_window_location);
        registry
    }

    /// Register `parser` for `event_type`, replacing any previous one.
    pub fn register(&mut self, event_type: EventType, parser: ParseFn) {
        self.parsers.insert(event_type.as_str(), parser);
    }

    /// True if a parser exists for the wire type name.
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.parsers.contains_key(type_name)
    }

    /// Parse one event.
    ///
    /// Unregistered types keep only the envelope, typed `Unknown`. In every
    /// branch the event carries `sensor` and `group` from the caller.
    pub fn parse_event(&self, raw: &str, sensor: Uuid, group: Uuid) -> Result<Event, EventError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| EventError::Json(e.to_string()))?;
        let object = value.as_object().ok_or(EventError::NotAnObject)?;

        let envelope = validate_envelope(object)?;
        let stamped = SensorEvent::new(EventType::Unknown, envelope.time, sensor, group);

        match self.parsers.get(envelope.type_name) {
            Some(parser) => parser(object, stamped),
            None => Ok(Event::Unknown(stamped)),
        }
    }

    /// Parse a request body holding a JSON array of events.
    ///
    /// A body that is not a JSON array fails as a whole. Elements that fail
    /// to parse are logged and skipped. Returns events in array order.
    pub fn parse_batch(&self, body: &[u8], sensor: Uuid, group: Uuid) -> Result<Vec<Event>, EventError> {
        let elements: Vec<Box<RawValue>> =
            serde_json::from_slice(body).map_err(|e| EventError::InvalidBatch(e.to_string()))?;

        let mut events = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            match self.parse_event(element.get(), sensor, group) {
                Ok(event) => events.push(event),
                Err(e) => {
                    info!(index, error = %e, sensor = %sensor, "Skipping event due to failed parsing");
                }
            }
        }

        Ok(events)
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.parsers.keys().collect();
        types.sort();
        f.debug_struct("ParserRegistry").field("types", &types).finish()
    }
}
