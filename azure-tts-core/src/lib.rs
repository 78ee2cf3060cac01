pub mod command;
pub mod credentials;
pub mod env;
pub mod error;
pub mod output;
pub mod settings;
pub mod voice;

pub use command::{speak, CommandContext, Outcome, SpeakArgs};
pub use error::{Result, TtsError};
pub use settings::{EndpointConfig, SettingsManager};
pub use voice::tts::{AzureOpenAiTts, SynthesisRequest, TextToSpeech, Voice};
