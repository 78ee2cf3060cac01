use crate::env::{Env, USER_PATH_VAR};
use crate::error::{Result, TtsError};
use crate::settings::config::TtsSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locates and reads the persisted endpoint settings. The manager is an
/// explicit value handed to whoever needs it, so tests can point it at a
/// temporary directory instead of the user's real config.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    user_dir: PathBuf,
}

impl SettingsManager {
    /// Create a settings manager rooted at the default user directory
    /// (`$AZURE_TTS_USER_PATH`, or `<config dir>/azure-tts`).
    pub fn new(env: &dyn Env) -> Result<Self> {
        Ok(Self::from_user_dir(Self::default_user_dir(env)?))
    }

    /// Create a settings manager rooted at a specific user directory
    pub fn from_user_dir(user_dir: PathBuf) -> Self {
        Self { user_dir }
    }

    fn default_user_dir(env: &dyn Env) -> Result<PathBuf> {
        if let Some(path) = env.var(USER_PATH_VAR) {
            return Ok(PathBuf::from(path));
        }
        let config = dirs::config_dir().ok_or_else(|| TtsError::Config {
            path: PathBuf::from("~"),
            message: "Failed to locate the user config directory".to_string(),
        })?;
        Ok(config.join("azure-tts"))
    }

    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    /// `<user dir>/azure/tts.yaml`
    pub fn path(&self) -> PathBuf {
        self.user_dir.join("azure").join("tts.yaml")
    }

    /// Load the settings file. The `azure` directory is created if it does
    /// not exist yet; a missing or empty file yields empty settings.
    pub fn load(&self) -> Result<TtsSettings> {
        let path = self.path();
        self.ensure_dir(&path)?;

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {path:?}, using empty settings");
                return Ok(TtsSettings::default());
            }
            Err(e) => {
                return Err(TtsError::Config {
                    path,
                    message: e.to_string(),
                })
            }
        };

        // An empty document parses as `null`.
        let parsed: Option<TtsSettings> =
            serde_yaml::from_str(&contents).map_err(|e| TtsError::Config {
                path: path.clone(),
                message: e.to_string(),
            })?;

        debug!("Loaded settings from {path:?}");
        Ok(parsed.unwrap_or_default())
    }

    /// Persist settings, replacing the file contents
    pub fn save(&self, settings: &TtsSettings) -> Result<()> {
        let path = self.path();
        self.ensure_dir(&path)?;

        let contents = serde_yaml::to_string(settings).map_err(|e| TtsError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, contents).map_err(|e| TtsError::Config {
            path: path.clone(),
            message: format!("Failed to write settings: {e}"),
        })?;

        debug!("Saved settings to {path:?}");
        Ok(())
    }

    // create_dir_all tolerates a concurrent invocation creating it first.
    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TtsError::Config {
                path: parent.to_path_buf(),
                message: format!("Failed to create directory: {e}"),
            })?;
        }
        Ok(())
    }
}
