//! Command implementations.
//!
//! Every command that touches the profile goes through a loaded
//! [`ProfileEditor`], so validation and reload-after-write behave exactly
//! as they do in the client.

pub mod addresses;
pub mod auth;
pub mod profile;
pub mod regions;

use std::error::Error;
use std::sync::Arc;

use chodocu_client::{ClientConfig, HttpProfileStore, ProfileEditor};
use serde::Serialize;

/// Build an editor for the configured session and load the aggregate.
pub(crate) async fn loaded_editor(config: &ClientConfig) -> Result<ProfileEditor, Box<dyn Error>> {
    let auth = config.require_session()?;
    let store = Arc::new(HttpProfileStore::new(config)?);
    let editor = ProfileEditor::new(auth, store);
    editor.load_profile().await.map_err(|e| e.user_message())?;
    Ok(editor)
}

/// Log the outcome of a settled save.
pub(crate) fn report_saved(editor: &ProfileEditor) {
    if let Some(message) = editor.success_message() {
        tracing::info!("{message}");
    }
    // A failed reload after a successful write
    if let Some(error) = editor.state().error {
        tracing::warn!("Saved, but the profile could not be reloaded: {error}");
    }
}

#[allow(clippy::print_stdout)]
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
