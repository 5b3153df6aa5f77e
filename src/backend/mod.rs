//! Remote extraction backends
//!
//! Each provider is an opaque text-completion service behind one operation:
//! send a prompt, get raw text back. The prompt contract and all response
//! parsing/validation live on our side, so providers stay interchangeable.

pub mod gemini;
pub mod groq;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;

use crate::error::MagnoResult;

pub use gemini::GeminiBackend;
pub use groq::GroqBackend;

/// A remote text-completion service used for entity extraction
#[async_trait]
pub trait RemoteExtractor: Send + Sync {
    /// Provider name used in error strings and audit logs
    fn name(&self) -> &'static str;

    /// Send a prompt, return the raw completion text
    async fn extract(&self, prompt: &str) -> MagnoResult<String>;
}
