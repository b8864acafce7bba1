//! The backend seam: anything that turns a prompt into reply text.

use async_trait::async_trait;

use docbase_core::Result;

/// A generative-language backend.
///
/// The production implementation is [`crate::GeminiClient`]; tests
/// substitute canned replies behind the same trait.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Send one prompt and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`docbase_core::DocbaseError::BackendStatus`] for non-success
    /// HTTP statuses, [`docbase_core::DocbaseError::Backend`] for transport
    /// failures, and [`docbase_core::DocbaseError::MalformedResponse`] when
    /// a success reply carries no usable text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
