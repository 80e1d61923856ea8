pub mod cli;
pub mod error;
pub mod history;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;

use cli::Args;
use history::create_history_store;
use llm::chat::new_client as new_chat_client;
use llm::{ LlmConfig, LlmType };
use log::info;
use relay::CompletionRelay;
use server::Server;
use std::error::Error;
use std::time::Duration;

pub fn chat_config(args: &Args) -> Result<LlmConfig, Box<dyn Error + Send + Sync>> {
    let llm_type: LlmType = args.chat_llm_type.parse()?;
    Ok(LlmConfig {
        llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        timeout: match args.upstream_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
    })
}

pub fn build_relay(args: &Args) -> Result<CompletionRelay, Box<dyn Error + Send + Sync>> {
    let chat_config = chat_config(args)?;
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, Endpoint={}",
        chat_config.llm_type,
        chat_client.get_model(),
        chat_client.get_base_url().as_deref().unwrap_or("adapter default")
    );

    let history_store = create_history_store(args);
    Ok(
        CompletionRelay::new(chat_client, history_store)
            .with_system_prompt(args.system_prompt.clone())
            .serialize_turns(!args.no_serialize_turns)
    )
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Static Directory: {}", args.static_dir);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat API Key Set: {}", !args.chat_api_key.is_empty());
    info!("History Cap: {}", match args.history_max_conversations {
        0 => "unbounded".to_string(),
        n => n.to_string(),
    });
    info!("Serialize Turns Per Client: {}", !args.no_serialize_turns);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let relay = build_relay(&args)?;
    info!("System Prompt: {:?}", relay.system_prompt());
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, relay, args);
    server.run().await?;

    Ok(())
}
