use std::net::SocketAddr;

use anyhow::{bail, Context};

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Deployment environment, controls query logging and error detail logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Dev,
    Test,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw {
            "dev" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => bail!("unknown environment {other:?}, expected dev, test or production"),
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Absent keys fall back
    /// to defaults, present keys must parse.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            Some(raw) => AppEnv::parse(raw.trim()).context("APP_ENV")?,
            None => AppEnv::Dev,
        };

        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let port = parse_or("PORT", &lookup, 3333u16)?;

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "accounts".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "accounts-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", &lookup, 10)?,
            refresh_ttl_minutes: parse_or("JWT_REFRESH_TTL_MINUTES", &lookup, 60 * 24 * 7)?,
        };
        for (key, minutes) in [
            ("JWT_TTL_MINUTES", jwt.ttl_minutes),
            ("JWT_REFRESH_TTL_MINUTES", jwt.refresh_ttl_minutes),
        ] {
            if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
                bail!("{key} must be between 1 and {MAX_TTL_MINUTES} minutes, got {minutes}");
            }
        }

        Ok(Self {
            env,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            jwt,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has invalid value {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = load(&[("JWT_SECRET", "s3cret")]).expect("config loads");
        assert_eq!(cfg.env, AppEnv::Dev);
        assert_eq!(cfg.port, 3333);
        assert_eq!(cfg.jwt.ttl_minutes, 10);
        assert_eq!(cfg.jwt.refresh_ttl_minutes, 7 * 24 * 60);
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn missing_secret_fails() {
        let err = load(&[("PORT", "8080")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn non_numeric_port_fails() {
        assert!(load(&[("JWT_SECRET", "x"), ("PORT", "eighty")]).is_err());
    }

    #[test]
    fn unknown_environment_fails() {
        assert!(load(&[("JWT_SECRET", "x"), ("APP_ENV", "staging")]).is_err());
    }

    #[test]
    fn oversized_token_lifetime_fails() {
        let err = load(&[("JWT_SECRET", "x"), ("JWT_TTL_MINUTES", "10000000000")]).unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_MINUTES"));
        assert!(load(&[("JWT_SECRET", "x"), ("JWT_REFRESH_TTL_MINUTES", "0")]).is_err());
    }

    #[test]
    fn one_year_lifetime_is_the_limit() {
        let cfg = load(&[("JWT_SECRET", "x"), ("JWT_REFRESH_TTL_MINUTES", "525600")])
            .expect("config loads");
        assert_eq!(cfg.jwt.refresh_ttl_minutes, MAX_TTL_MINUTES);
    }

    #[test]
    fn node_env_is_accepted_as_alias() {
        let cfg = load(&[("JWT_SECRET", "x"), ("NODE_ENV", "production")]).expect("config loads");
        assert!(cfg.env.is_production());
    }

    #[test]
    fn listen_addr_uses_host_and_port() {
        let cfg = load(&[("JWT_SECRET", "x"), ("APP_HOST", "127.0.0.1"), ("PORT", "4000")])
            .expect("config loads");
        assert_eq!(cfg.listen_addr().unwrap().to_string(), "127.0.0.1:4000");
    }
}
