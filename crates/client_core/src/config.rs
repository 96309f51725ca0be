use std::{collections::HashMap, fs};

pub const DEFAULT_API_URL: &str = "https://68a02b6c6e38a02c5817eb50.mockapi.io/v1/api";
const SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
        }
    }
}

/// Defaults, then `catalog.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "config: ignoring unparsable settings file");
        return;
    };
    if let Some(v) = file_cfg.get("api_url") {
        settings.api_url = v.clone();
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["CATALOG_API_URL", "APP__API_URL"] {
        if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
            settings.api_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_hosted_mock_endpoint() {
        assert_eq!(ClientSettings::default().api_url, DEFAULT_API_URL);
    }

    #[test]
    fn file_then_env_override_api_url() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(&mut settings, "api_url = \"http://127.0.0.1:8080\"\n");
        assert_eq!(settings.api_url, "http://127.0.0.1:8080");

        apply_env_overrides(&mut settings, |key| {
            (key == "APP__API_URL").then(|| "http://127.0.0.1:9090".to_string())
        });
        assert_eq!(settings.api_url, "http://127.0.0.1:9090");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(&mut settings, |_| Some("  ".to_string()));
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn non_string_file_values_leave_defaults() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(&mut settings, "api_url = 3\n");
        assert_eq!(settings, ClientSettings::default());
    }
}
