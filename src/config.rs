//! Configuration loading and validation.

use crate::error::{ConfigError, Result};
use crate::llm::ollama::{BackendEndpoint, normalize_ollama_base_url};

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Model served by the inference backend.
pub const DEFAULT_MODEL: &str = "boug_bot:HC";

/// Source of environment variables.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Bougbot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

/// Discord connection settings.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    pub token: String,

    /// Guild that slash commands are registered in. Global when unset.
    pub guild_id: Option<u64>,
}

/// Inference backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Ollama base URL. Falls back to the local default when unset.
    pub base_url: Option<String>,

    /// Model identifier sent with every chat request.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl LlmConfig {
    /// Resolve the endpoint a single call should target.
    pub fn endpoint(&self) -> BackendEndpoint {
        BackendEndpoint {
            url: normalize_ollama_base_url(self.base_url.clone()),
            model: Arc::from(self.model.as_str()),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    discord: FileDiscord,
    llm: FileLlm,
    logging: FileLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileDiscord {
    token: Option<String>,
    guild_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileLlm {
    base_url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileLogging {
    dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment and an optional TOML file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, &SystemEnv)
    }

    /// Load configuration, reading variables through `env`.
    ///
    /// Environment values take precedence over the file.
    pub fn load_with_env(path: Option<&Path>, env: &impl ReadEnv) -> Result<Self> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };

        let token = non_empty(env.var("BOT_TOKEN"))
            .or(non_empty(file.discord.token))
            .ok_or_else(|| ConfigError::MissingKey("BOT_TOKEN".into()))?;

        let guild_id = match non_empty(env.var("GUILD_ID")) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!("GUILD_ID must be a numeric id, got '{raw}'"))
            })?),
            None => file.discord.guild_id,
        };
        if guild_id == Some(0) {
            return Err(ConfigError::Invalid("GUILD_ID must not be zero".into()).into());
        }

        let base_url = non_empty(env.var("OLLAMA_API_URL")).or(non_empty(file.llm.base_url));
        let model = non_empty(file.llm.model).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let log_dir = non_empty(env.var("LOG_DIR"))
            .map(PathBuf::from)
            .or(file.logging.dir);

        Ok(Self {
            discord: DiscordConfig { token, guild_id },
            llm: LlmConfig { base_url, model },
            logging: LoggingConfig { dir: log_dir },
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Load {
        path: path.display().to_string(),
        source: Arc::new(source),
    })?;

    let file = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source: Box::new(source),
    })?;

    Ok(file)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct InMemoryEnv(HashMap<&'static str, &'static str>);

    impl InMemoryEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().cloned().collect())
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_from_env_with_defaults() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "TOKEN-1")]);

        let config = Config::load_with_env(None, &env).unwrap();

        assert_eq!(config.discord.token, "TOKEN-1");
        assert_eq!(config.discord.guild_id, None);
        assert_eq!(config.llm, LlmConfig::default());
        assert!(config.logging.dir.is_none());
        assert_eq!(config.llm.endpoint().url, "http://localhost:11434");
        assert_eq!(&*config.llm.endpoint().model, DEFAULT_MODEL);
    }

    #[test]
    fn missing_token_is_an_error() {
        let env = InMemoryEnv::new(&[("OLLAMA_API_URL", "http://127.0.0.1:11434")]);

        let error = Config::load_with_env(None, &env).unwrap_err();

        assert!(matches!(
            error,
            Error::Config(ConfigError::MissingKey(ref key)) if key == "BOT_TOKEN"
        ));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "   ")]);

        assert!(Config::load_with_env(None, &env).is_err());
    }

    #[test]
    fn reads_endpoint_guild_and_log_dir_from_env() {
        let env = InMemoryEnv::new(&[
            ("BOT_TOKEN", "TOKEN"),
            ("GUILD_ID", "123456789012345678"),
            ("OLLAMA_API_URL", "http://10.0.0.5:11434/api/"),
            ("LOG_DIR", "/var/log/bougbot"),
        ]);

        let config = Config::load_with_env(None, &env).unwrap();

        assert_eq!(config.discord.guild_id, Some(123456789012345678));
        assert_eq!(config.llm.endpoint().url, "http://10.0.0.5:11434");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/bougbot")));
    }

    #[test]
    fn invalid_guild_id_is_rejected() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "TOKEN"), ("GUILD_ID", "general")]);

        let error = Config::load_with_env(None, &env).unwrap_err();

        assert!(error.to_string().contains("GUILD_ID"));
    }

    #[test]
    fn zero_guild_id_is_rejected() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "TOKEN"), ("GUILD_ID", "0")]);

        let error = Config::load_with_env(None, &env).unwrap_err();

        assert!(matches!(error, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn file_values_are_used_when_env_is_silent() {
        let f = write_toml(
            r#"
[discord]
token = "FILE-TOKEN"
guild_id = 42

[llm]
base_url = "http://gpu-box:11434"
model = "llama3:8b"

[logging]
dir = "logs"
"#,
        );
        let env = InMemoryEnv::new(&[]);

        let config = Config::load_with_env(Some(f.path()), &env).unwrap();

        assert_eq!(config.discord.token, "FILE-TOKEN");
        assert_eq!(config.discord.guild_id, Some(42));
        assert_eq!(config.llm.endpoint().url, "http://gpu-box:11434");
        assert_eq!(config.llm.model, "llama3:8b");
        assert_eq!(config.logging.dir, Some(PathBuf::from("logs")));
    }

    #[test]
    fn env_overrides_file() {
        let f = write_toml(
            r#"
[discord]
token = "FILE-TOKEN"
guild_id = 42

[llm]
base_url = "http://gpu-box:11434"
"#,
        );
        let env = InMemoryEnv::new(&[
            ("BOT_TOKEN", "ENV-TOKEN"),
            ("GUILD_ID", "7"),
            ("OLLAMA_API_URL", "http://127.0.0.1:11434"),
        ]);

        let config = Config::load_with_env(Some(f.path()), &env).unwrap();

        assert_eq!(config.discord.token, "ENV-TOKEN");
        assert_eq!(config.discord.guild_id, Some(7));
        assert_eq!(config.llm.endpoint().url, "http://127.0.0.1:11434");
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn unreadable_file_is_a_load_error() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "TOKEN")]);

        let error =
            Config::load_with_env(Some(Path::new("/nonexistent/bougbot.toml")), &env).unwrap_err();

        assert!(matches!(error, Error::Config(ConfigError::Load { .. })));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let f = write_toml("this is not valid toml !!!");
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "TOKEN")]);

        let error = Config::load_with_env(Some(f.path()), &env).unwrap_err();

        assert!(matches!(error, Error::Config(ConfigError::Parse { .. })));
    }
}
