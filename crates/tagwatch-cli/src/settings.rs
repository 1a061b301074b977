//! Per-environment settings file.
//!
//! ```json
//! { "staging": { "mapping": { "c1": "Page name" }, "missing_page_policy": "abort" } }
//! ```
//!
//! Keys used only by snapshot acquisition (urls, hosts, cookies, ...) are
//! ignored here.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tagwatch_compare::{CompareOptions, MissingPagePolicy, NameMapping};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub mapping: NameMapping,
    #[serde(default)]
    pub missing_page_policy: MissingPagePolicy,
    #[serde(default)]
    pub validate_observed: bool,
}

impl Settings {
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            missing_page_policy: self.missing_page_policy,
            validate_observed: self.validate_observed,
        }
    }
}

pub fn load(path: &Path, env: &str) -> Result<Settings, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read settings file {}: {err}", path.display()))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let parsed = if is_toml {
        parse_toml(&text, env)
    } else {
        parse_json(&text, env)
    };
    parsed.map_err(|err| format!("{}: {err}", path.display()))
}

fn parse_json(text: &str, env: &str) -> Result<Settings, String> {
    let root: serde_json::Value =
        serde_json::from_str(text).map_err(|err| format!("invalid json: {err}"))?;
    let section = root
        .get(env)
        .ok_or_else(|| format!("environment `{env}` not found"))?;
    Settings::deserialize(section).map_err(|err| format!("invalid section `{env}`: {err}"))
}

fn parse_toml(text: &str, env: &str) -> Result<Settings, String> {
    let root: toml::Table = toml::from_str(text).map_err(|err| format!("invalid toml: {err}"))?;
    let section = root
        .get(env)
        .ok_or_else(|| format!("environment `{env}` not found"))?;
    section
        .clone()
        .try_into::<Settings>()
        .map_err(|err| format!("invalid section `{env}`: {err}"))
}
