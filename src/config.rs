use serde::Deserialize;

/// Argon2 work-factor parameters, tunable per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        // Argon2id defaults from the argon2 crate.
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env_u16("APP_PORT", 8080);
        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: env_u32("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: env_u32("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: env_u32("ARGON2_PARALLELISM", defaults.parallelism),
        };
        Ok(Self {
            database_url,
            host,
            port,
            hash,
        })
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default)
}
