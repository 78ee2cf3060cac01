use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};

/// Audio returned from TTS synthesis. The bytes are passed through exactly
/// as the service sent them (usually MP3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    pub bytes: Vec<u8>,
}

/// Voices offered by the speech endpoint
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    #[default]
    Onyx,
    Nova,
    Shimmer,
}

/// A single piece of text to speak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    voice: Voice,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: Voice) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }
        Ok(Self { text, voice })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }
}
