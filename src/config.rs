use serde::Deserialize;

use crate::error::FxResult;

pub const CONFIG_ELEMENT_ID: &str = "site-motion-config";

#[cfg(debug_assertions)]
pub fn get_form_endpoint() -> &'static str {
    "http://localhost:3001/contact" // Local form sink while developing
}

#[cfg(not(debug_assertions))]
pub fn get_form_endpoint() -> &'static str {
    "https://formspree.io/f/xeovqbeo"
}

/// Tunables for the page enhancements. Every field has a default so the page
/// config block only needs to name what it overrides.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub form_endpoint: String,
    pub animation_library_src: String,
    pub particle_count: usize,
    pub particle_duration_ms: u32,
    pub bubble_lifetime_ms: u32,
    pub button_reset_ms: u32,
    pub button_pulse_ms: u32,
    pub sync_interval_ms: u32,
    pub sync_tolerance_secs: f64,
    pub hint_auto_hide_ms: u32,
    pub hint_fade_ms: u32,
    pub counter_duration_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            form_endpoint: get_form_endpoint().to_string(),
            animation_library_src: "gsap-public/umd/gsap.js".to_string(),
            particle_count: 30,
            particle_duration_ms: 2500,
            bubble_lifetime_ms: 2600,
            button_reset_ms: 2000,
            button_pulse_ms: 800,
            sync_interval_ms: 1200,
            sync_tolerance_secs: 0.033,
            hint_auto_hide_ms: 2200,
            hint_fade_ms: 1100,
            counter_duration_ms: 1400,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> FxResult<Config> {
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads the optional JSON block `<script id="site-motion-config">`.
    pub fn from_document(document: &web_sys::Document) -> Config {
        let Some(node) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
            return Config::default();
        };
        let raw = node.text_content().unwrap_or_default();
        match Config::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring page config: {}", e);
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_gives_defaults() {
        assert_eq!(Config::from_json("  ").unwrap(), Config::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = Config::from_json(r#"{"particleCount": 12, "syncIntervalMs": 500}"#).unwrap();
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.sync_interval_ms, 500);
        assert_eq!(config.bubble_lifetime_ms, 2600);
        assert_eq!(config.sync_tolerance_secs, 0.033);
    }

    #[test]
    fn malformed_block_is_an_error() {
        assert!(Config::from_json("{particleCount:").is_err());
    }
}
