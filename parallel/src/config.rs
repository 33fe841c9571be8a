use std::env;
use std::path::PathBuf;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Read a string variable, treating blank values as unset.
fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies; document uploads arrive base64 encoded.
    pub max_body_bytes: usize,
}

/// Where the CLI front end sends its analysis requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// LLM configuration for the classification and drafting model
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    /// Server-side credential. Absence is reported as a configuration error
    /// on every request rather than at startup.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
        }
    }
}

pub const DEFAULT_LLM_MODEL: &str = "gemini/gemini-2.0-flash";

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("parallel"))
        .unwrap_or_else(|| PathBuf::from(".parallel"))
}

impl Default for Config {
    fn default() -> Self {
        let port = parse_env_or("PARALLEL_PORT", 3000);

        Self {
            server: ServerConfig {
                host: env::var("PARALLEL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                max_body_bytes: parse_env_or("PARALLEL_MAX_BODY_BYTES", 20 * 1024 * 1024),
            },
            client: ClientConfig {
                api_url: env_non_empty("PARALLEL_API_URL")
                    .unwrap_or_else(|| format!("http://localhost:{port}")),
            },
            storage: StorageConfig {
                data_dir: env_non_empty("PARALLEL_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_data_dir),
            },
            llm: LlmConfig {
                model: env_non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                api_key: env_non_empty("LLM_API_KEY").or_else(|| env_non_empty("GEMINI_API_KEY")),
                base_url: env_non_empty("LLM_BASE_URL"),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that expose OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["gemini", "openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
