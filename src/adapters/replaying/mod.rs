//! Replaying adapters that serve recorded interactions from cassettes.

pub mod generation_service;

use std::sync::{Arc, Mutex};

use crate::cassette::format::Interaction;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::GenerateError;

/// Take the next recorded interaction for a port and method.
pub(crate) fn next_interaction(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<Interaction, GenerateError> {
    let mut guard = replayer
        .lock()
        .map_err(|e| GenerateError::Replayed(format!("replayer lock poisoned: {e}")))?;
    guard.next_interaction(port, method).map_err(GenerateError::Replayed)
}

/// Deserialize a replayed output as `Result<T, GenerateError>`.
///
/// An `Err` object with a `status` becomes [`GenerateError::Api`]; any other
/// `Err` value becomes [`GenerateError::Replayed`].
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, GenerateError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        if let Some(status) = err_val.get("status").and_then(serde_json::Value::as_u64) {
            return Err(GenerateError::Api {
                status: u16::try_from(status).unwrap_or(u16::MAX),
                detail: err_val.get("detail").and_then(|d| d.as_str()).map(str::to_string),
            });
        }
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(GenerateError::Replayed(msg));
    }
    let ok_val = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    serde_json::from_value(ok_val)
        .map_err(|e| GenerateError::Replayed(format!("Failed to decode replayed output: {e}")))
}
