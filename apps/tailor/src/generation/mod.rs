// Request composition and response parsing around the single generation call.
// All LLM calls go through llm_client; no direct Anthropic API calls here.

pub mod composer;
pub mod prompts;
pub mod response;
