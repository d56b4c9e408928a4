//! Blocking user notices.

/// Show `message` in a blocking alert dialog.
///
/// Falls back to a log line when no window is available.
pub fn notify(message: &str) {
    let shown = web_sys::window().is_some_and(|w| w.alert_with_message(message).is_ok());
    if !shown {
        tracing::warn!(%message, "notice could not be shown");
    }
}
