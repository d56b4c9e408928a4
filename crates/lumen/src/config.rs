//! Build-time configuration of the web app.
//!
//! The app is a static bundle, so settings are baked in at compile time:
//! `LUMEN_BACKEND_URL` and `LUMEN_DEBOUNCE_MS`.

use lumen_client::BackendConfig;

/// Delay between the last edit and sending the render request.
pub const DEFAULT_DEBOUNCE_MS: u32 = 150;

/// Settings the app runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend to render with.
    pub backend: BackendConfig,
    /// Quiet period before a render request is sent.
    pub debounce_ms: u32,
}

impl AppConfig {
    /// Configuration from the compile-time environment.
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("LUMEN_BACKEND_URL"),
            option_env!("LUMEN_DEBOUNCE_MS"),
        )
    }

    fn from_values(backend_url: Option<&str>, debounce_ms: Option<&str>) -> Self {
        let backend = backend_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or_else(BackendConfig::default, BackendConfig::new);
        let debounce_ms = debounce_ms.map_or(DEFAULT_DEBOUNCE_MS, |raw| {
            raw.trim().parse().unwrap_or_else(|e| {
                tracing::warn!(%raw, error = %e, "ignoring invalid LUMEN_DEBOUNCE_MS");
                DEFAULT_DEBOUNCE_MS
            })
        });
        Self {
            backend,
            debounce_ms,
        }
    }
}
