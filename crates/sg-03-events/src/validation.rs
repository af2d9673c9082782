//! Field validation for untrusted event JSON.

use crate::errors::EventError;
use crate::event::MAX_TYPE_LEN;
use serde_json::{Map, Value};
use std::net::{Ipv4Addr, Ipv6Addr};
use uuid::Uuid;

/// JSON object being validated.
pub type Object = Map<String, Value>;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Validated envelope fields: the declared type name and the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub type_name: &'a str,
    pub time: i64,
}

/// Check the fields every event carries.
///
/// `type` must be alphabetic and at most 255 characters, `time` a
/// non-negative integer. `sensor` and `group` are optional but must be UUID
/// strings when present. Their values are never used.
pub fn validate_envelope(object: &Object) -> Result<Envelope<'_>, EventError> {
    let type_name = required_str(object, "type")?;
    if type_name.chars().count() > MAX_TYPE_LEN {
        return Err(EventError::invalid(
            "type",
            format!("longer than {} characters", MAX_TYPE_LEN),
        ));
    }
    if !type_name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EventError::invalid("type", "must be alphabetic"));
    }

    let time = required_non_negative(object, "time")?;
    let time = i64::try_from(time).map_err(|_| EventError::invalid("time", "out of range"))?;

    optional_uuid(object, "sensor")?;
    optional_uuid(object, "group")?;

    Ok(Envelope { type_name, time })
}

/// Required string field.
pub fn required_str<'a>(object: &'a Object, field: &'static str) -> Result<&'a str, EventError> {
    match object.get(field) {
        None => Err(EventError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(EventError::invalid(field, "must be a string")),
    }
}

/// Required integer field that is zero or greater.
///
/// Numbers written with a zero fraction (`1.0`) count as integers.
pub fn required_non_negative(object: &Object, field: &'static str) -> Result<u64, EventError> {
    match object.get(field) {
        None => Err(EventError::MissingField(field)),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.as_i64().is_some() {
                Err(EventError::invalid(field, "must not be negative"))
            } else {
                match n.as_f64() {
                    Some(v) if v.fract() != 0.0 => Err(EventError::invalid(field, "must be an integer")),
                    Some(v) if v < 0.0 => Err(EventError::invalid(field, "must not be negative")),
                    // 2^64
                    Some(v) if v < 18_446_744_073_709_551_616.0 => Ok(v as u64),
                    _ => Err(EventError::invalid(field, "out of range")),
                }
            }
        }
        Some(_) => Err(EventError::invalid(field, "must be an integer")),
    }
}

/// Required port number in `0..=65535`.
pub fn required_port(object: &Object, field: &'static str) -> Result<u16, EventError> {
    let value = required_non_negative(object, field)?;
    u16::try_from(value).map_err(|_| EventError::invalid(field, "must be at most 65535"))
}

fn optional_uuid(object: &Object, field: &'static str) -> Result<(), EventError> {
    match object.get(field) {
        None => Ok(()),
        Some(Value::String(s)) if Uuid::parse_str(s).is_ok() => Ok(()),
        Some(_) => Err(EventError::invalid(field, "must be a UUID string")),
    }
}

/// True for a hostname, internationalized hostname, IPv4 or IPv6 address.
pub fn is_valid_host(host: &str) -> bool {
    host.parse::<Ipv4Addr>().is_ok() || host.parse::<Ipv6Addr>().is_ok() || is_valid_hostname(host)
}

/// RFC 1123 hostname, allowing non-ASCII alphanumeric characters in labels.
pub fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.chars().count() > MAX_HOSTNAME_LEN {
        return false;
    }

    host.split('.').all(|label| {
        let len = label.chars().count();
        len > 0
            && len <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}
