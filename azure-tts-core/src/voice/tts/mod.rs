pub mod azure_openai;
pub mod provider;
pub mod retry_after;
pub mod types;

pub use azure_openai::AzureOpenAiTts;
pub use provider::TextToSpeech;
pub use retry_after::RetryAfter;
pub use types::{AudioData, SynthesisRequest, Voice};
