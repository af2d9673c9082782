//! Token claims.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a sensor token. Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Sensor group
    pub group: Uuid,
    /// Sensor identity
    pub sensor: Uuid,
    /// Expires at
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
}

impl Claims {
    /// Claims valid from `now` for `duration_secs` seconds.
    pub fn new(group: Uuid, sensor: Uuid, now: i64, duration_secs: i64) -> Self {
        Self {
            group,
            sensor,
            exp: now.saturating_add(duration_secs),
            iat: now,
            nbf: now,
        }
    }
}
