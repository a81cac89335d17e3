//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](wabot_core::llm::LlmProvider)
//! used for private-chat replies: a plain `reqwest` client for any
//! OpenAI-compatible `/chat/completions` endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatibleProvider;
