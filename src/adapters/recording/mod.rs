//! Recording adapters that capture interactions to cassettes.

pub mod image_generator;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Reserve a cassette slot for a call that is about to be issued.
///
/// Must run before the call's future is first awaited so that concurrent
/// calls keep their issue order. Returns `None` if the input cannot be
/// serialized or the recorder lock is poisoned; the call still proceeds.
pub(crate) fn reserve_call<I: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
) -> Option<u64> {
    let input_json = match serde_json::to_value(input) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(port, method, "skipping cassette interaction: {e}");
            return None;
        }
    };

    match recorder.lock() {
        Ok(mut guard) => Some(guard.reserve(port, method, input_json)),
        Err(e) => {
            tracing::warn!(port, method, "recorder lock poisoned: {e}");
            None
        }
    }
}

/// Fill a reserved slot with a `Result<T, E>` using the Ok/Err JSON convention.
///
/// Failures are logged and leave the slot empty; recording never changes the
/// outcome seen by the caller.
pub(crate) fn complete_call<T, E>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    seq: u64,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
{
    let output_json = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => serde_json::json!({ "Ok": inner }),
            Err(e) => {
                tracing::warn!(seq, "skipping cassette output: {e}");
                return;
            }
        },
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };

    match recorder.lock() {
        Ok(mut guard) => {
            if !guard.complete(seq, output_json) {
                tracing::warn!(seq, "no reserved cassette slot");
            }
        }
        Err(e) => tracing::warn!(seq, "recorder lock poisoned: {e}"),
    }
}
