//! Recording adapters that capture interactions to cassettes.

pub mod page_generator;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Shared recorder slot. The slot is emptied when the recording session is
/// finished; interactions after that point are silently dropped.
pub(crate) type SharedRecorder = Arc<Mutex<Option<CassetteRecorder>>>;

/// Record a `Result<T, E>` interaction using the `Ok`/`Err` JSON convention.
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let input_json = serde_json::to_value(input).expect("failed to serialize recording input");
    let output_json = match result {
        Ok(value) => {
            let inner = serde_json::to_value(value).expect("failed to serialize Ok value");
            serde_json::json!({ "Ok": inner })
        }
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };

    if let Some(rec) = recorder.lock().expect("recorder lock poisoned").as_mut() {
        rec.record(port, method, input_json, output_json);
    }
}
