use anyhow::Result;
use client_core::view::{ViewError, ViewState};
use serde::Serialize;

/// Text form of one console region.
pub fn render_region<T: Serialize>(name: &str, state: &ViewState<T>) -> Result<String> {
    Ok(match state {
        ViewState::Idle => format!("[{name}] idle"),
        ViewState::Loading => format!("[{name}] loading"),
        ViewState::Success(value) => {
            format!("[{name}]\n{}", serde_json::to_string_pretty(value)?)
        }
        ViewState::Error(err) => format!("[{name}] error: {}", describe(err)),
    })
}

fn describe(err: &ViewError) -> String {
    match err {
        ViewError::Rejected(kind) => format!("ledger rejected the request ({kind:?})"),
        ViewError::Invalid(message) => format!("invalid input: {message}"),
        ViewError::Transport(message) => message.clone(),
    }
}
