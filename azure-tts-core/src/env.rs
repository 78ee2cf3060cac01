use std::collections::HashMap;

pub const API_BASE_VAR: &str = "AZURE_OPENAI_TTS_API_BASE";
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_TTS_API_VERSION";
pub const DEPLOYMENT_NAME_VAR: &str = "AZURE_OPENAI_TTS_DEPLOYMENT_NAME";
pub const API_KEY_VAR: &str = "AZURE_OPENAI_TTS_API_KEY";
pub const USER_PATH_VAR: &str = "AZURE_TTS_USER_PATH";

/// Source of environment variables. Empty values are reported as unset.
pub trait Env {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed set of variables, used to run commands without touching the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).filter(|value| !value.is_empty()).cloned()
    }
}
