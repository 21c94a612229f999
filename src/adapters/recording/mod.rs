//! Recording adapters that capture interactions to cassettes.

pub mod generation_service;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;
use crate::error::GenerateError;

/// Record a `Result<T, GenerateError>` using the `Ok`/`Err` JSON convention.
///
/// API errors keep their status and detail so replay can reproduce the
/// user-facing message; other errors are stored as their display text.
pub(crate) fn record_result<T, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, GenerateError>,
    latency: Duration,
) where
    T: Serialize,
    I: Serialize,
{
    let input_json = match serde_json::to_value(input) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(port, method, "skipping recording, input not serializable: {e}");
            return;
        }
    };

    let output_json = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => serde_json::json!({ "Ok": inner }),
            Err(e) => {
                tracing::warn!(port, method, "skipping recording, output not serializable: {e}");
                return;
            }
        },
        Err(GenerateError::Api { status, detail }) => {
            serde_json::json!({ "Err": { "status": status, "detail": detail } })
        }
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };

    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input_json, output_json, latency),
        Err(e) => tracing::warn!(port, method, "recorder lock poisoned: {e}"),
    }
}
