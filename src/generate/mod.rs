/*!
 * Generative-language collaborators.
 *
 * The pipeline only needs "prompt in, text out"; `TextGenerator` is that seam,
 * `gemini` is the production client and `prompts` holds the fixed templates.
 */

use async_trait::async_trait;

pub mod gemini;
pub mod prompts;

use crate::Result;

/// A text-generation service used for both translation and notes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for status output
    fn model_name(&self) -> String;
}
