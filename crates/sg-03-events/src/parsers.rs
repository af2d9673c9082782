//! Typed parsers for the registered event types.
//!
//! Each parser receives the already validated envelope with the
//! authenticated identity, checks its own required fields, then builds the
//! typed event.

use crate::errors::EventError;
use crate::event::{Event, EventType, SensorEvent, WindowEvent, WindowLocationEvent};
use crate::validation::{is_valid_host, required_non_negative, required_port, required_str, Object};

/// `Window` carries no fields beyond the envelope.
pub fn parse_window(_object: &Object, envelope: SensorEvent) -> Result<Event, EventError> {
    Ok(Event::Window(WindowEvent {
        envelope: SensorEvent {
            event_type: EventType::Window,
            ..envelope
        },
    }))
}

/// `WindowLocation` requires all seven location fields.
pub fn parse_window_location(object: &Object, envelope: SensorEvent) -> Result<Event, EventError> {
    let protocol = required_str(object, "protocol")?;
    let hostname = required_str(object, "hostname")?;
    let port = required_port(object, "port")?;
    let path = required_str(object, "path")?;
    let search = required_str(object, "search")?;
    let hash = required_str(object, "hash")?;
    let window_reference = required_non_negative(object, "windowReference")?;

    if !is_valid_host(hostname) {
        return Err(EventError::invalid(
            "hostname",
            "must be a hostname or IP address",
        ));
    }

    Ok(Event::WindowLocation(WindowLocationEvent {
        envelope: SensorEvent {
            event_type: EventType::WindowLocation,
            ..envelope
        },
        protocol: protocol.to_owned(),
        hostname: hostname.to_owned(),
        port,
        path: path.to_owned(),
        search: search.to_owned(),
        hash: hash.to_owned(),
        window_reference,
    }))
}
