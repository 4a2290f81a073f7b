//! Configuration module for textchat.

use serde::Deserialize;
use std::path::Path;

use crate::protocol::DEFAULT_MAX_RESPONSE_BYTES;
use crate::{ChatError, Result};

/// Smallest accepted frame limit; anything lower cannot carry a login request.
const MIN_FRAME_BYTES: usize = 256;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Seconds a connection may stay silent before it is closed.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Maximum size of a single request frame in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7777
}

fn default_max_connections() -> usize {
    32
}

fn default_read_timeout() -> u64 {
    300
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
            read_timeout_secs: default_read_timeout(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

/// Mailbox configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    /// Maximum number of unread messages kept per user.
    #[serde(default = "default_mailbox_capacity")]
    pub capacity: usize,
}

fn default_mailbox_capacity() -> usize {
    256
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            capacity: default_mailbox_capacity(),
        }
    }
}

/// An account inserted into the directory at startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SeedAccount {
    /// Display nickname.
    pub name: String,
    /// Login identifier.
    pub login: String,
    /// Plaintext password, digested before storage.
    pub password: String,
}

impl SeedAccount {
    fn new(name: &str, login: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            login: login.to_string(),
            password: password.to_string(),
        }
    }
}

/// Seed data configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Accounts created before the server starts accepting connections.
    #[serde(default = "default_seed_accounts")]
    pub accounts: Vec<SeedAccount>,
}

fn default_seed_accounts() -> Vec<SeedAccount> {
    vec![
        SeedAccount::new("G", "Ger", "123"),
        SeedAccount::new("S", "Sve", "qwe"),
    ]
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            accounts: default_seed_accounts(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/textchat.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Console client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server host to connect to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port to connect to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Path to the client log file.
    #[serde(default = "default_client_log_file")]
    pub log_file: String,
    /// Largest response frame the client accepts.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_client_log_file() -> String {
    "logs/textchat-client.log".to_string()
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            log_file: default_client_log_file(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Mailbox configuration.
    #[serde(default)]
    pub mailbox: MailboxConfig,
    /// Seed accounts.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Client configuration.
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ChatError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChatError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TEXTCHAT_LOG_LEVEL`: log level for both binaries
    /// - `TEXTCHAT_HOST`: bind address for the server and target for the client
    /// - `TEXTCHAT_PORT`: port for the server and the client
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("TEXTCHAT_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }

        if let Ok(host) = std::env::var("TEXTCHAT_HOST") {
            if !host.is_empty() {
                self.server.host = host.clone();
                self.client.host = host;
            }
        }

        // Unparsable ports are ignored rather than reset to zero
        if let Some(port) = std::env::var("TEXTCHAT_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.server.port = port;
            self.client.port = port;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_connections == 0 {
            return Err(ChatError::Validation(
                "server.max_connections must be at least 1".to_string(),
            ));
        }
        if self.server.read_timeout_secs == 0 {
            return Err(ChatError::Validation(
                "server.read_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.server.max_frame_bytes < MIN_FRAME_BYTES {
            return Err(ChatError::Validation(format!(
                "server.max_frame_bytes must be at least {MIN_FRAME_BYTES}"
            )));
        }
        if self.mailbox.capacity == 0 {
            return Err(ChatError::Validation(
                "mailbox.capacity must be at least 1".to_string(),
            ));
        }
        // A full mailbox must fit in one response frame.
        let full_mailbox = self
            .mailbox
            .capacity
            .saturating_mul(self.server.max_frame_bytes);
        if self.client.max_response_bytes < full_mailbox {
            return Err(ChatError::Validation(format!(
                "client.max_response_bytes must be at least mailbox.capacity * server.max_frame_bytes ({full_mailbox})"
            )));
        }
        for account in &self.seed.accounts {
            if account.name.is_empty() || account.login.is_empty() || account.password.is_empty()
            {
                return Err(ChatError::Validation(format!(
                    "seed account {:?} has an empty field",
                    account.login
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7777);
        assert_eq!(config.server.max_connections, 32);
        assert_eq!(config.server.read_timeout_secs, 300);
        assert_eq!(config.server.max_frame_bytes, 65536);

        assert_eq!(config.mailbox.capacity, 256);

        assert_eq!(config.seed.accounts.len(), 2);
        assert_eq!(config.seed.accounts[0], SeedAccount::new("G", "Ger", "123"));
        assert_eq!(config.seed.accounts[1], SeedAccount::new("S", "Sve", "qwe"));

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/textchat.log");

        assert_eq!(config.client.host, "127.0.0.1");
        assert_eq!(config.client.port, 7777);
        assert_eq!(config.client.connect_timeout_secs, 5);
        assert_eq!(config.client.max_response_bytes, 32 * 1024 * 1024);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
max_connections = 4
read_timeout_secs = 60
max_frame_bytes = 4096

[mailbox]
capacity = 10

[[seed.accounts]]
name = "Ann"
login = "ann"
password = "secret"

[logging]
level = "debug"
file = "custom/chat.log"

[client]
host = "chat.local"
port = 9001
connect_timeout_secs = 2
log_file = "custom/client.log"
max_response_bytes = 1048576
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_connections, 4);
        assert_eq!(config.server.read_timeout_secs, 60);
        assert_eq!(config.server.max_frame_bytes, 4096);

        assert_eq!(config.mailbox.capacity, 10);

        assert_eq!(
            config.seed.accounts,
            vec![SeedAccount::new("Ann", "ann", "secret")]
        );

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/chat.log");

        assert_eq!(config.client.host, "chat.local");
        assert_eq!(config.client.port, 9001);
        assert_eq!(config.client.connect_timeout_secs, 2);
        assert_eq!(config.client.log_file, "custom/client.log");
        assert_eq!(config.client.max_response_bytes, 1048576);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 3000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mailbox.capacity, 256);
        assert_eq!(config.seed.accounts.len(), 2);
    }

    #[test]
    fn test_parse_empty_seed_list() {
        let config = Config::parse("[seed]\naccounts = []\n").unwrap();
        assert!(config.seed.accounts.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(ChatError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mailbox]\ncapacity = 3").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.mailbox.capacity, 3);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(result.is_err());
        assert!(matches!(result, Err(ChatError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_level = std::env::var("TEXTCHAT_LOG_LEVEL").ok();
        let original_port = std::env::var("TEXTCHAT_PORT").ok();

        std::env::set_var("TEXTCHAT_LOG_LEVEL", "trace");
        std::env::set_var("TEXTCHAT_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.server.port, 7777);
        assert_eq!(config.client.port, 7777);

        match original_level {
            Some(val) => std::env::set_var("TEXTCHAT_LOG_LEVEL", val),
            None => std::env::remove_var("TEXTCHAT_LOG_LEVEL"),
        }
        match original_port {
            Some(val) => std::env::set_var("TEXTCHAT_PORT", val),
            None => std::env::remove_var("TEXTCHAT_PORT"),
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_response_limit_must_hold_full_mailbox() {
        let mut config = Config::default();
        config.mailbox.capacity = 1024;

        let result = config.validate();
        assert!(
            matches!(result, Err(ChatError::Validation(msg)) if msg.contains("max_response_bytes"))
        );

        config.client.max_response_bytes = 1024 * config.server.max_frame_bytes;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.mailbox.capacity = 0;

        let result = config.validate();
        assert!(matches!(result, Err(ChatError::Validation(msg)) if msg.contains("capacity")));
    }

    #[test]
    fn test_validate_small_frame_limit() {
        let mut config = Config::default();
        config.server.max_frame_bytes = 16;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_seed_field() {
        let mut config = Config::default();
        config.seed.accounts.push(SeedAccount::new("", "nobody", "pw"));

        let result = config.validate();
        assert!(matches!(result, Err(ChatError::Validation(msg)) if msg.contains("nobody")));
    }
}
