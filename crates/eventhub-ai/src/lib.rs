//! LLM-backed text generation for event pages and the student chatbot.

pub mod content;
pub mod llm_provider;
pub mod openai_compatible_provider;

pub use content::{ContentGenerator, MAX_CHAT_HISTORY};
pub use llm_provider::{GenerationConfig, LLMProvider, LLMResponse, LLMResult, Message, MessageRole};
pub use openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
