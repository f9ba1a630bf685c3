use serde::Deserialize;

/// Server configuration read from the environment (and `.env` when present)
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Memoised provider expansions kept before the memo is cleared; 0 disables it
    #[serde(default = "default_expansion_cache_capacity")]
    pub expansion_cache_capacity: usize,

    /// Install a permissive CORS layer for browser clients
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_expansion_cache_capacity() -> usize {
    256
}

fn default_cors_permissive() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expansion_cache_capacity: default_expansion_cache_capacity(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Builds the config from explicit key/value pairs (uppercase env-style keys)
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
