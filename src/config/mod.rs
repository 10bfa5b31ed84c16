use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

pub(crate) const DEFAULT_PLACEHOLDER_LABEL: &str = "Image failed to load";

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    #[default]
    Warn,
    Error,
    Off,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: LogLevel,
    pub placeholder_label: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            placeholder_label: DEFAULT_PLACEHOLDER_LABEL.to_string(),
        }
    }
}

impl EnvConfig {
    /// Reads `window.ENV`, falling back to defaults outside a browser.
    pub fn new() -> Self {
        let mut config = Self::default();

        let Some(window) = web_sys::window() else {
            return config;
        };
        let Some(env) = window.get("ENV") else {
            return config;
        };
        if env.is_undefined() || !env.is_object() {
            return config;
        }

        // Same convention as API_URL: prefer the upper-case key, accept lower-case.
        let read = |upper: &str, lower: &str| -> Option<String> {
            [upper, lower].into_iter().find_map(|key| {
                js_sys::Reflect::get(&env, &key.into())
                    .ok()
                    .and_then(|v| v.as_string())
            })
        };

        if let Some(level) = read("LOG_LEVEL", "log_level") {
            config.log_level = parse_log_level(&level);
        }
        if let Some(label) = read("IMAGE_PLACEHOLDER", "image_placeholder") {
            if !label.trim().is_empty() {
                config.placeholder_label = label;
            }
        }

        config
    }
}

pub(crate) fn parse_log_level(raw: &str) -> LogLevel {
    LogLevel::from_str(raw.trim()).unwrap_or_default()
}
