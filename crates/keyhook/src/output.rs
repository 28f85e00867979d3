//! Line rendering for `keyhook-tap`.

use keyhook_core::KeyEvent;

use crate::infrastructure::storage::config::OutputFormat;

/// Renders one event as a single output line (without the trailing newline).
///
/// Text lines look like `KeyEvent(code: 65, state: down)`, followed by the
/// `VK_*` name in brackets when `show_key_names` is set and the code has one.
/// JSON lines carry the event fields plus `key_name` (or `null`).
pub fn render_event(event: &KeyEvent, format: OutputFormat, show_key_names: bool) -> String {
    match format {
        OutputFormat::Text => match event.key_name().filter(|_| show_key_names) {
            Some(name) => format!("{event} [{name}]"),
            None => event.to_string(),
        },
        OutputFormat::Json => serde_json::json!({
            "vk_code": event.vk_code,
            "scan_code": event.scan_code,
            "is_down": event.is_down,
            "key_name": event.key_name(),
        })
        .to_string(),
    }
}
