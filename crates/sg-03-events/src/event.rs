//! Event types.
//!
//! Events serialize as flat JSON objects: envelope fields first, then the
//! variant fields, with camelCase keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of the `type` field.
pub const MAX_TYPE_LEN: usize = 255;

/// Known event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Sensor installed or renewed (server generated)
    Install,
    /// Window opened on the sensor
    Window,
    /// Page navigation within a window
    WindowLocation,
    /// Type not registered with the gateway
    Unknown,
}

impl EventType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "Install",
            Self::Window => "Window",
            Self::WindowLocation => "WindowLocation",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields common to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Event type
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Microseconds since the UTC epoch
    pub time: i64,
    /// Authenticated sensor
    pub sensor: Uuid,
    /// Authenticated group
    pub group: Uuid,
}

impl SensorEvent {
    /// Envelope stamped with the authenticated identity.
    pub fn new(event_type: EventType, time: i64, sensor: Uuid, group: Uuid) -> Self {
        Self {
            event_type,
            time,
            sensor,
            group,
        }
    }
}

/// Emitted by the gateway when a sensor installs or renews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallEvent {
    #[serde(flatten)]
    pub envelope: SensorEvent,
    /// Operator supplied label from the install request
    pub label: String,
}

/// A window was opened on the sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEvent {
    #[serde(flatten)]
    pub envelope: SensorEvent,
}

/// A window navigated to a new location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowLocationEvent {
    #[serde(flatten)]
    pub envelope: SensorEvent,
    pub protocol: String,
    /// Hostname, IDN hostname or IP address
    pub hostname: String,
    /// Zero when the URL carries no explicit port
    pub port: u16,
    pub path: String,
    pub search: String,
    pub hash: String,
    /// Refers to the [`WindowEvent`] of the window this happened in
    pub window_reference: u64,
}

/// A parsed, identity-stamped event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Event {
    Install(InstallEvent),
    Window(WindowEvent),
    WindowLocation(WindowLocationEvent),
    Unknown(SensorEvent),
}

impl Event {
    /// Server generated install event.
    pub fn install(label: impl Into<String>, time: i64, sensor: Uuid, group: Uuid) -> Self {
        Self::Install(InstallEvent {
            envelope: SensorEvent::new(EventType::Install, time, sensor, group),
            label: label.into(),
        })
    }

    /// Common envelope.
    pub fn envelope(&self) -> &SensorEvent {
        match self {
            Self::Install(e) => &e.envelope,
            Self::Window(e) => &e.envelope,
            Self::WindowLocation(e) => &e.envelope,
            Self::Unknown(e) => e,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.envelope().event_type
    }

    pub fn time(&self) -> i64 {
        self.envelope().time
    }

    pub fn sensor(&self) -> Uuid {
        self.envelope().sensor
    }

    pub fn group(&self) -> Uuid {
        self.envelope().group
    }
}
