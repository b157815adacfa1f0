use clap::Parser;

/// Terminal chat client for webhook and chat-trigger backends.
///
/// Settings come from the config file, then `CHAT_*` environment variables
/// (and `.env`), then these flags.
#[derive(Parser, Debug, Default)]
#[command(name = "chatwire", version, about = "Terminal chat client for webhook and chat-trigger backends")]
pub struct CliArgs {
    /// Path to config file (default: ~/.config/chatwire/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Webhook endpoint override
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Chat-trigger endpoint override (selects chat-trigger mode)
    #[arg(long)]
    pub chat_trigger_url: Option<String>,

    /// Ask the chat trigger to stream replies
    #[arg(long)]
    pub stream: bool,

    /// Path of the file the session id is persisted in
    #[arg(long)]
    pub storage: Option<String>,

    /// Keep the session id in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Logical path reported in request metadata
    #[arg(long, default_value = "/cli")]
    pub path: String,

    /// Print the resolved (redacted) configuration and exit
    #[arg(long)]
    pub show_config: bool,
}
