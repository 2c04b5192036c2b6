use rig::{agent::Agent, client::CompletionClient, providers::openrouter};

const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Build a completion agent with the given preamble.
///
/// Requires `OPENROUTER_API_KEY`; the model can be overridden with
/// `CLAIMS_LLM_MODEL`.
pub fn claims_agent(preamble: &str) -> anyhow::Result<Agent<openrouter::CompletionModel>> {
    let api_key = std::env::var("OPENROUTER_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENROUTER_API_KEY not set"))?;
    let model = std::env::var("CLAIMS_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let client = openrouter::Client::new(&api_key);
    Ok(client.agent(&model).preamble(preamble).build())
}

/// Build a completion agent with no standing instructions, for plain
/// free-form chat.
pub fn plain_agent() -> anyhow::Result<Agent<openrouter::CompletionModel>> {
    let api_key = std::env::var("OPENROUTER_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENROUTER_API_KEY not set"))?;
    let model = std::env::var("CLAIMS_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let client = openrouter::Client::new(&api_key);
    Ok(client.agent(&model).build())
}
