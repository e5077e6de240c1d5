//! Replaying adapters that serve recorded interactions from cassettes.

pub mod page_generator;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Take the next recorded output for a given port and method.
///
/// # Panics
///
/// Panics if the replayer lock is poisoned or the cassette is exhausted.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output
}

/// Deserialize a replayed output recorded with the `Ok`/`Err` convention.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, String> {
    if let Some(err_val) = output.get("Err") {
        return Err(err_val.as_str().unwrap_or("replayed error").to_string());
    }
    let inner = output.get("Ok").cloned().unwrap_or(output);
    serde_json::from_value(inner).map_err(|e| format!("malformed recorded output: {e}"))
}
