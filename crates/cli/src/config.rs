use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use chatwire_core::ChatConfig;

use crate::cli::CliArgs;

/// Return the default config directory path: ~/.config/chatwire/
pub fn default_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("could not determine user config directory")?
        .join("chatwire");
    Ok(config_dir)
}

/// Return the default config file path.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_config_dir()?.join("config.toml"))
}

/// Load the config file at `path`.
/// Returns defaults (and writes them out) if the file does not exist.
pub fn load_file(path: &Path) -> Result<ChatConfig> {
    if path.exists() {
        debug!(?path, "Loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config = ChatConfig::from_toml_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    } else {
        debug!(?path, "Config file not found, using defaults");
        let config = ChatConfig::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let toml_str =
            toml::to_string_pretty(&config).context("failed to serialize default config")?;
        std::fs::write(path, toml_str).ok();
        Ok(config)
    }
}

/// Apply command-line overrides on top of file + environment config.
pub fn apply_overrides(mut config: ChatConfig, args: &CliArgs) -> ChatConfig {
    if let Some(url) = &args.webhook_url {
        config.webhook_url = Some(url.clone());
    }
    if let Some(url) = &args.chat_trigger_url {
        config.chat_trigger_url = Some(url.clone());
    }
    if args.stream {
        config.streaming = true;
    }
    config
}

/// Resolve the effective config.
/// Priority: cli flags > env vars > config file > defaults.
pub fn load(args: &CliArgs) -> Result<ChatConfig> {
    let path = match args.config.as_deref() {
        Some(p) => PathBuf::from(p),
        None => default_config_path()?,
    };
    let config = load_file(&path)?.merge_env();
    Ok(apply_overrides(config, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatwire_core::TransportMode;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatwire").join("config.toml");

        let config = load_file(&path).unwrap();
        assert_eq!(config, ChatConfig::default());
        assert!(path.exists());

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "webhook_url = \"http://localhost:5678/webhook/chat\"\nchat_input_key = \"input\"\n",
        )
        .unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("http://localhost:5678/webhook/chat")
        );
        assert_eq!(config.chat_input_key, "input");
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "webhook_url = [").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_flags_override() {
        let args = CliArgs {
            chat_trigger_url: Some("http://trigger".into()),
            stream: true,
            ..CliArgs::default()
        };
        let config = apply_overrides(ChatConfig::default(), &args);
        assert_eq!(config.transport_mode(), TransportMode::ChatTrigger);
        assert!(config.streaming);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut base = ChatConfig::default();
        base.webhook_url = Some("http://hook".into());
        base.streaming = true;
        let config = apply_overrides(base.clone(), &CliArgs::default());
        assert_eq!(config, base);
    }
}
