//! One `azure-tts` invocation, from raw arguments to bytes on the sink.
//!
//! Everything the command touches outside the process (environment,
//! credential store, settings directory, stdio) is passed in, so the whole
//! flow runs the same under tests as it does in the binary.

use std::io::{Read, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::credentials::{resolve_api_key, CredentialStore, SERVICE_NAME};
use crate::env::Env;
use crate::error::{rate_limit_message, Result, TtsError};
use crate::output::OutputSink;
use crate::settings::{resolve, ConfigOverrides, SettingsManager};
use crate::voice::tts::{AzureOpenAiTts, SynthesisRequest, TextToSpeech, Voice};

/// Argument value meaning "read the text from stdin".
pub const STDIN_MARKER: &str = "-";

#[derive(Debug, Clone)]
pub struct SpeakArgs {
    pub text: String,
    pub key: Option<String>,
    pub voice: Voice,
    pub output: OutputSink,
    pub overrides: ConfigOverrides,
}

impl Default for SpeakArgs {
    fn default() -> Self {
        Self {
            text: STDIN_MARKER.to_string(),
            key: None,
            voice: Voice::default(),
            output: OutputSink::Stdout,
            overrides: ConfigOverrides::default(),
        }
    }
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { bytes: usize },
    /// The service answered 429. Nothing was written; `message` tells the
    /// user how long to wait.
    RateLimited { message: String },
}

/// External collaborators of a run
pub struct CommandContext<'a> {
    pub env: &'a dyn Env,
    pub store: &'a dyn CredentialStore,
    pub settings: &'a SettingsManager,
}

/// Resolve the text argument, reading all of stdin for `-`.
pub fn read_text(arg: &str, stdin: &mut dyn Read) -> Result<String> {
    if arg != STDIN_MARKER {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

/// Run a full synthesis: text, config, key, request, output.
///
/// Empty text, missing config and a missing key all fail before any
/// network activity. A 429 is turned into [`Outcome::RateLimited`]; every
/// other failure is returned as is.
pub async fn speak(
    args: SpeakArgs,
    ctx: &CommandContext<'_>,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<Outcome> {
    let text = read_text(&args.text, stdin)?;
    let request = SynthesisRequest::new(text, args.voice)?;

    let file_settings = ctx.settings.load()?;
    let endpoint = resolve(
        &args.overrides,
        ctx.env,
        &file_settings,
        &ctx.settings.path(),
    )?;
    let api_key = resolve_api_key(args.key.as_deref(), ctx.env, ctx.store)?;

    info!(
        "Synthesizing via deployment {} (api-version {}), voice {}",
        endpoint.deployment_name,
        endpoint.api_version,
        request.voice()
    );

    let provider = AzureOpenAiTts::new(endpoint, api_key);
    synthesize_to(&provider, &request, &args.output, stdout).await
}

/// Call `provider` and write the audio to `sink`. Split out of [`speak`]
/// so any [`TextToSpeech`] implementation can be driven through the same
/// output and rate-limit handling.
pub async fn synthesize_to(
    provider: &dyn TextToSpeech,
    request: &SynthesisRequest,
    sink: &OutputSink,
    stdout: &mut dyn Write,
) -> Result<Outcome> {
    match provider.synthesize(request).await {
        Ok(audio) => {
            sink.write(&audio.bytes, stdout)?;
            info!("Wrote {} bytes of audio", audio.bytes.len());
            Ok(Outcome::Written {
                bytes: audio.bytes.len(),
            })
        }
        Err(TtsError::RateLimited { retry_after }) => {
            let message = rate_limit_message(retry_after.as_ref());
            warn!("{message}");
            Ok(Outcome::RateLimited { message })
        }
        Err(e) => Err(e),
    }
}

/// Store an API key under [`SERVICE_NAME`]. The key comes from `key` or,
/// when that is absent, the first line of stdin.
pub fn set_key(
    key: Option<&str>,
    store: &dyn CredentialStore,
    stdin: &mut dyn Read,
) -> Result<()> {
    let key = match key {
        Some(key) => key.trim().to_string(),
        None => {
            let mut input = String::new();
            stdin.read_to_string(&mut input)?;
            input.lines().next().unwrap_or_default().trim().to_string()
        }
    };

    if key.is_empty() {
        return Err(TtsError::MissingCredential);
    }

    store.set(SERVICE_NAME, &key)?;
    info!("Stored API key under {SERVICE_NAME}");
    Ok(())
}

/// Merge the explicitly passed endpoint values into the settings file and
/// return its path.
pub fn save_config(overrides: &ConfigOverrides, settings: &SettingsManager) -> Result<PathBuf> {
    let merged = settings.load()?.merge(overrides);
    settings.save(&merged)?;
    info!("Saved endpoint settings to {:?}", settings.path());
    Ok(settings.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryStore;
    use crate::error::TtsError;
    use crate::settings::TtsSettings;
    use crate::voice::tts::{AudioData, RetryAfter};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Provider returning a canned result and counting calls
    struct CannedTts {
        rate_limited: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextToSpeech for CannedTts {
        async fn synthesize(&self, _request: &SynthesisRequest) -> Result<AudioData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.rate_limited {
                return Err(TtsError::RateLimited {
                    retry_after: Some(RetryAfter::from_seconds(12)),
                });
            }
            Ok(AudioData {
                bytes: b"canned".to_vec(),
            })
        }
    }

    #[test]
    fn test_read_text_from_argument() {
        let mut stdin = Cursor::new("ignored");
        assert_eq!(read_text("Hello", &mut stdin).unwrap(), "Hello");
    }

    #[test]
    fn test_read_text_from_stdin() {
        let mut stdin = Cursor::new("piped text\n");
        assert_eq!(read_text("-", &mut stdin).unwrap(), "piped text\n");
    }

    #[tokio::test]
    async fn test_synthesize_to_writes_audio() {
        let provider = CannedTts {
            rate_limited: false,
            calls: AtomicUsize::new(0),
        };
        let request = SynthesisRequest::new("hi", Voice::Echo).unwrap();
        let mut stdout = Vec::new();

        let outcome = synthesize_to(&provider, &request, &OutputSink::Stdout, &mut stdout)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Written { bytes: 6 });
        assert_eq!(stdout, b"canned");
    }

    #[tokio::test]
    async fn test_synthesize_to_recovers_rate_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.mp3");
        let provider = CannedTts {
            rate_limited: true,
            calls: AtomicUsize::new(0),
        };
        let request = SynthesisRequest::new("hi", Voice::Echo).unwrap();
        let mut stdout = Vec::new();

        let outcome = synthesize_to(
            &provider,
            &request,
            &OutputSink::File(path.clone()),
            &mut stdout,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            Outcome::RateLimited {
                message: "Rate limit exceeded. Need to wait for 12 seconds before retrying."
                    .to_string()
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_set_key_from_argument() {
        let store = MemoryStore::new();
        set_key(Some(" abc "), &store, &mut Cursor::new("")).unwrap();
        assert_eq!(store.get(SERVICE_NAME).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_set_key_from_stdin_first_line() {
        let store = MemoryStore::new();
        set_key(None, &store, &mut Cursor::new("from-stdin\nextra\n")).unwrap();
        assert_eq!(
            store.get(SERVICE_NAME).unwrap().as_deref(),
            Some("from-stdin")
        );
    }

    #[test]
    fn test_set_key_rejects_empty() {
        let store = MemoryStore::new();
        let err = set_key(None, &store, &mut Cursor::new("")).unwrap_err();
        assert!(matches!(err, TtsError::MissingCredential));
        assert_eq!(store.get(SERVICE_NAME).unwrap(), None);
    }

    #[test]
    fn test_save_config_merges() {
        let temp_dir = TempDir::new().unwrap();
        let settings = SettingsManager::from_user_dir(temp_dir.path().to_path_buf());
        settings
            .save(&TtsSettings {
                api_base: Some("https://api.example.com".to_string()),
                api_version: Some("2024-02-15".to_string()),
                deployment_name: None,
            })
            .unwrap();

        let overrides = ConfigOverrides {
            deployment_name: Some("tts-1".to_string()),
            ..Default::default()
        };
        let path = save_config(&overrides, &settings).unwrap();

        assert_eq!(path, settings.path());
        let saved = settings.load().unwrap();
        assert_eq!(saved.api_base.as_deref(), Some("https://api.example.com"));
        assert_eq!(saved.deployment_name.as_deref(), Some("tts-1"));
    }
}
