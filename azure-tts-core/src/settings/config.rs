use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::env::{Env, API_BASE_VAR, API_VERSION_VAR, DEPLOYMENT_NAME_VAR};
use crate::error::{Result, TtsError};

/// Contents of `azure/tts.yaml`. Every key is optional; an empty or absent
/// file deserializes to all `None`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TtsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
}

impl TtsSettings {
    /// Overlay the values present in `other` on top of `self`.
    pub fn merge(mut self, other: &ConfigOverrides) -> Self {
        if let Some(api_base) = non_empty(&other.api_base) {
            self.api_base = Some(api_base);
        }
        if let Some(api_version) = non_empty(&other.api_version) {
            self.api_version = Some(api_version);
        }
        if let Some(deployment_name) = non_empty(&other.deployment_name) {
            self.deployment_name = Some(deployment_name);
        }
        self
    }
}

/// Values passed explicitly on the command line. These win over both the
/// environment and the settings file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
    pub api_version: Option<String>,
    pub deployment_name: Option<String>,
}

/// Fully resolved address of the speech endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub base_url: String,
    pub api_version: String,
    pub deployment_name: String,
}

impl EndpointConfig {
    pub fn speech_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/audio/speech?api-version={}",
            self.base_url, self.deployment_name, self.api_version
        )
    }
}

/// Merge the three configuration layers. Precedence is CLI override, then
/// environment variable, then the settings file. A field that is still
/// unset after all three is an error; `settings_path` is only used to
/// point the user at the file in that message.
pub fn resolve(
    overrides: &ConfigOverrides,
    env: &dyn Env,
    file: &TtsSettings,
    settings_path: &Path,
) -> Result<EndpointConfig> {
    let pick = |cli: &Option<String>,
                var: &'static str,
                from_file: &Option<String>,
                field: &'static str,
                flag: &'static str|
     -> Result<String> {
        non_empty(cli)
            .or_else(|| env.var(var))
            .or_else(|| non_empty(from_file))
            .ok_or_else(|| TtsError::MissingConfig {
                field,
                flag,
                env_var: var,
                path: settings_path.to_path_buf(),
            })
    };

    let base_url = pick(
        &overrides.api_base,
        API_BASE_VAR,
        &file.api_base,
        "api_base",
        "api-base",
    )?;
    let api_version = pick(
        &overrides.api_version,
        API_VERSION_VAR,
        &file.api_version,
        "api_version",
        "api-version",
    )?;
    let deployment_name = pick(
        &overrides.deployment_name,
        DEPLOYMENT_NAME_VAR,
        &file.deployment_name,
        "deployment_name",
        "deployment",
    )?;

    Ok(EndpointConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        api_version,
        deployment_name,
    })
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
