use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:fittrack.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3000),
            access_token_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", 24 * 60),
            refresh_token_ttl_days: parse_or("REFRESH_TOKEN_TTL_DAYS", 30),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: chrono::Duration::minutes(self.access_token_ttl_minutes),
            refresh: chrono::Duration::days(self.refresh_token_ttl_days),
        }
    }
}

/// How long issued access and refresh tokens stay valid.
#[derive(Clone, Copy, Debug)]
pub struct TokenLifetimes {
    pub access: chrono::Duration,
    pub refresh: chrono::Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: chrono::Duration::hours(24),
            refresh: chrono::Duration::days(30),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
