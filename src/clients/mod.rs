pub mod llm_client;
pub mod openai_client;

#[cfg(test)]
pub(crate) mod scripted;

pub use llm_client::{CompletionRequest, LlmClient};
pub use openai_client::OpenAiClient;
