use std::time::Duration;

use anyhow::Context;
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use record_store::AirtableConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub max_form_bytes: usize,
    pub airtable: AirtableSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            max_form_bytes: 64 * 1024,
            airtable: AirtableSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirtableSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub ideas_table: String,
    pub blog_table: String,
    pub timeout_secs: u64,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        let defaults = AirtableConfig::default();
        Self {
            api_url: defaults.api_url,
            api_key: None,
            base_id: None,
            ideas_table: defaults.ideas_table,
            blog_table: defaults.blog_table,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl AirtableSettings {
    pub fn to_config(&self) -> AirtableConfig {
        AirtableConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            base_id: self.base_id.clone(),
            ideas_table: self.ideas_table.clone(),
            blog_table: self.blog_table.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|v| !v.is_empty())
            && self.base_id.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// `server.toml` (optional), then `APP__*` variables, then the bare
/// `SERVER_BIND` / `AIRTABLE_*` variables used by existing deployments.
pub fn load_settings() -> anyhow::Result<Settings> {
    let builder = config::Config::builder()
        .add_source(File::with_name("server").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );
    let mut settings = build_settings(builder)?;
    apply_plain_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn build_settings(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    builder
        .build()
        .context("failed to read server settings")?
        .try_deserialize()
        .context("invalid server settings")
}

fn apply_plain_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("AIRTABLE_API_KEY") {
        settings.airtable.api_key = Some(v);
    }
    if let Some(v) = var("AIRTABLE_BASE_ID") {
        settings.airtable.base_id = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
