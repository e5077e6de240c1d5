//! On-disk cassette format shared by the recorder and the replayer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded sequence of port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable name of the recording session.
    pub name: String,
    /// When the cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made at, or `"unknown"`.
    pub commit: String,
    /// The recorded interactions, in call order.
    pub interactions: Vec<Interaction>,
}

/// One recorded call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the overall recording.
    pub seq: u64,
    /// Port name, e.g. `"page_generator"`.
    pub port: String,
    /// Method name, e.g. `"generate"`.
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized call output, using the `Ok`/`Err` convention.
    pub output: serde_json::Value,
}
