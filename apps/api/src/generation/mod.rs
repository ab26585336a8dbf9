// Generation: job analysis, fit scoring, prompt construction and the
// retrying client that talks to the configured backend.
// All LLM calls go through llm_client; nothing here speaks HTTP.

pub mod analysis;
pub mod client;
pub mod fit;
pub mod prompts;
