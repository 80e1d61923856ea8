use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Directory holding the frontend; `index.html` is served at `/`, the rest under `/static`.
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: String,

    /// Header naming the client (e.g. X-Forwarded-For). Defaults to the peer IP address.
    /// Only set this behind a proxy that overwrites the header.
    #[arg(long, env = "IDENTITY_HEADER")]
    pub identity_header: Option<String>,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (groq, openai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "groq")]
    pub chat_llm_type: String,

    /// Full chat-completions URL. Defaults to the provider's public endpoint.
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// Bearer key for the chat provider.
    #[arg(long, env = "GROQ_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., llama-3.1-8b-instant)
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// System prompt prepended to every upstream request.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = crate::llm::DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Upstream request timeout in seconds. 0 keeps the HTTP client's default.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "0")]
    pub upstream_timeout_secs: u64,

    // --- History Args ---
    /// Maximum number of client conversations kept in memory (least recently used evicted). 0 means unbounded.
    #[arg(long, env = "HISTORY_MAX_CONVERSATIONS", default_value = "0")]
    pub history_max_conversations: usize,

    /// Let concurrent questions from the same client interleave instead of answering them one at a time.
    #[arg(long, env = "NO_SERIALIZE_TURNS", default_value = "false")]
    pub no_serialize_turns: bool,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
