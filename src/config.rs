//! Configuration and CLI argument handling

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "mindwell")]
#[command(about = "Game session server and chat proxy for the MindWell wellness portal")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Period of the game clock in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// How long a revealed memory pair stays face-up, in milliseconds
    #[arg(long, default_value = "1000")]
    pub reveal_delay_ms: u64,

    /// Chat-completion endpoint the proxy forwards to
    #[arg(long, default_value = "https://api.openai.com/v1/chat/completions")]
    pub upstream_url: String,

    /// Model identifier sent upstream
    #[arg(short, long, default_value = "gpt-4")]
    pub model: String,

    /// Credential for the chat-completion API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["mindwell"]);
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.tick_ms, 1000);
        assert_eq!(config.reveal_delay_ms, 1000);
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "mindwell", "-p", "8080", "--host", "127.0.0.1", "--tick-ms", "250", "-v",
            "--api-key", "secret",
        ]);
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.log_level(), "debug");
    }
}
