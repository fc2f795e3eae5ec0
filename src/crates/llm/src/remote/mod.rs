//! Remote model provider implementations.
//!
//! # Providers
//!
//! - **Gemini** - Google's multimodal Gemini models

pub mod gemini;

pub use gemini::GeminiClient;
