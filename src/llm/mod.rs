//! Text-generation backend and the identity exchange that authorizes it.

use crate::error::LlmCallError;

pub mod token;
pub mod watsonx;

pub use token::IamTokenProvider;
pub use watsonx::WatsonxClient;

/// Prompt in, generated text out.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, LlmCallError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> Result<String, LlmCallError>,
{
    fn generate(&self, prompt: &str) -> Result<String, LlmCallError> {
        self(prompt)
    }
}
