//! NestBot configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NestBotError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestBotConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub brain: BrainConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub discord: DiscordChannelConfig,
}

impl NestBotConfig {
    /// Load config from the default path (~/.nestbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NestBotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| NestBotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the NestBot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nestbot")
    }
}

/// How the bot presents itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Role given to the model in the prompt.
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Disclaimer appended to every answer.
    #[serde(default = "default_signature")]
    pub signature: String,
}

fn default_persona() -> String { "Dying Light modder".into() }
fn default_signature() -> String { "\n\n🐊 NEST RUSHERS AI - INFORMATION MAY NOT BE CORRECT".into() }

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            signature: default_signature(),
        }
    }
}

/// Language model (llama.cpp server) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainConfig {
    /// Base URL of the completion server, without the `/v1` suffix.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name sent with each request (llama.cpp ignores it).
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Soft prompt budget in characters; informs the per-fact truncation.
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
    /// Concurrent inference calls allowed.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_endpoint() -> String { "http://127.0.0.1:8080".into() }
fn default_model() -> String { "llama-2-7b-chat.Q4_K_M.gguf".into() }
fn default_max_tokens() -> u32 { 200 }
fn default_temperature() -> f32 { 0.3 }
fn default_context_budget() -> usize { 450 }
fn default_workers() -> usize { 1 }

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            context_budget: default_context_budget(),
            workers: default_workers(),
        }
    }
}

/// Per-user cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_window_secs() -> u64 { 20 }

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { window_secs: default_window_secs() }
    }
}

/// Knowledge source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_path")]
    pub path: String,
}

fn default_knowledge_path() -> String { "modding_knowledge.json".into() }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self { path: default_knowledge_path() }
    }
}

/// Discord channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordChannelConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Bot token; falls back to the `DISCORD_TOKEN` environment variable.
    #[serde(default)]
    pub bot_token: String,
}

fn bool_true() -> bool { true }

impl Default for DiscordChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
        }
    }
}

impl DiscordChannelConfig {
    /// Token from config, else from `DISCORD_TOKEN`.
    pub fn resolve_token(&self) -> Option<String> {
        if !self.bot_token.is_empty() {
            return Some(self.bot_token.clone());
        }
        std::env::var("DISCORD_TOKEN").ok().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NestBotConfig::default();
        assert_eq!(config.rate_limit.window_secs, 20);
        assert_eq!(config.brain.max_tokens, 200);
        assert_eq!(config.brain.context_budget, 450);
        assert!((config.brain.temperature - 0.3).abs() < 0.001);
        assert_eq!(config.knowledge.path, "modding_knowledge.json");
        assert!(config.identity.signature.contains("NEST RUSHERS AI"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [identity]
            persona = "Minecraft modder"

            [brain]
            endpoint = "http://10.0.0.5:8080"
            workers = 2

            [rate_limit]
            window_secs = 5
        "#;

        let config: NestBotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.identity.persona, "Minecraft modder");
        assert_eq!(config.brain.endpoint, "http://10.0.0.5:8080");
        assert_eq!(config.brain.workers, 2);
        assert_eq!(config.brain.max_tokens, 200);
        assert_eq!(config.rate_limit.window_secs, 5);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: NestBotConfig = toml::from_str("").unwrap();
        assert_eq!(config.brain.endpoint, "http://127.0.0.1:8080");
        assert!(config.discord.enabled);
        assert!(config.discord.bot_token.is_empty());
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("nestbot-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[brain\nendpoint = ").unwrap();

        let err = NestBotConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, NestBotError::Config(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_explicit_token_wins() {
        let cfg = DiscordChannelConfig {
            enabled: true,
            bot_token: "abc".into(),
        };
        assert_eq!(cfg.resolve_token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_home_dir() {
        let home = NestBotConfig::home_dir();
        assert!(home.to_string_lossy().contains("nestbot"));
    }
}
