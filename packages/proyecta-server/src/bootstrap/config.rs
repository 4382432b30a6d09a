use anyhow::{Context, Result, bail};
use std::net::SocketAddr;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_URL: &str = "sqlite://proyecta.db?mode=rwc";
const DEFAULT_BCRYPT_COST: u32 = 10;
pub(crate) const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub(crate) addr: SocketAddr,
    pub(crate) db_url: String,
    pub(crate) session_secret: String,
    /// `Secure` is added to the session cookie when true.
    pub(crate) production: bool,
    pub(crate) bcrypt_cost: u32,
}

impl AppConfig {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_text = lookup("PROYECTA_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_text
            .parse()
            .with_context(|| format!("invalid PROYECTA_ADDR: {addr_text}"))?;

        let db_url = lookup("PROYECTA_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let session_secret =
            lookup("PROYECTA_SESSION_SECRET").context("PROYECTA_SESSION_SECRET is not set")?;
        if session_secret.len() < MIN_SECRET_LEN {
            bail!("PROYECTA_SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes");
        }

        let production = lookup("PROYECTA_ENV")
            .map(|env| env.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let bcrypt_cost = match lookup("PROYECTA_BCRYPT_COST") {
            Some(text) => text
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid PROYECTA_BCRYPT_COST: {text}"))?,
            None => DEFAULT_BCRYPT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("PROYECTA_BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}");
        }

        Ok(Self {
            addr,
            db_url,
            session_secret,
            production,
            bcrypt_cost,
        })
    }
}
