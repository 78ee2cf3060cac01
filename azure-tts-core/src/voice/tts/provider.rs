use async_trait::async_trait;

use super::types::{AudioData, SynthesisRequest};
use crate::error::Result;

/// Trait for text-to-speech providers
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text to speech audio
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioData>;
}
