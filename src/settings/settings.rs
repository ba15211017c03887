use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub credit_bureau: CreditBureau,
    pub http: Http,
    pub log: Log,
    pub sessions: Sessions,
    pub uploads: Uploads,
    pub users: Users,
}

#[derive(Deserialize)]
pub struct Auth {
    pub issuer: String,
    pub audience: String,
    /// Overridden by the `TOKEN_KEY` environment variable.
    pub signing_key: Option<String>,
    pub register_token_ttl_secs: u64,
    pub login_token_ttl_secs: u64,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "***"))
            .field("register_token_ttl_secs", &self.register_token_ttl_secs)
            .field("login_token_ttl_secs", &self.login_token_ttl_secs)
            .finish()
    }
}

#[derive(Deserialize)]
pub struct CreditBureau {
    pub backend: String, // "fake" or "real"
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    pub default_identifier: String,
    pub enquiry_reason: String,
    pub product_id: String,
    pub login_path: Option<String>,
    pub match_path: Option<String>,
    pub report_path: Option<String>,
}

impl std::fmt::Debug for CreditBureau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditBureau")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .field("default_identifier", &self.default_identifier)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Sessions {
    pub backend: String, // "fake" or "real"
    pub redis_dsn: Option<String>,
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct Uploads {
    pub dir: String,
    pub public_base_url: String,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct Users {
    pub backend: String, // "fake" or "real"
    pub mysql_dsn: Option<String>,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "BACKOFFICE";
const TOKEN_KEY_ENV: &str = "TOKEN_KEY";

/// Loads the TOML file, then applies `BACKOFFICE__SECTION__KEY` overrides
/// and the `TOKEN_KEY` signing key.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let mut settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if let Ok(key) = std::env::var(TOKEN_KEY_ENV) {
        if !key.is_empty() {
            settings.auth.signing_key = Some(key);
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn signing_key(&self) -> Result<Vec<u8>> {
        match self.auth.signing_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key.as_bytes().to_vec()),
            _ => Err(anyhow!(
                "no token signing key: set {} or auth.signing_key",
                TOKEN_KEY_ENV
            )),
        }
    }
}
