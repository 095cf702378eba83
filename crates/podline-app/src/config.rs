use podline_auth::{DiscoveryConfig, OidcClientConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub pod: PodConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Identity validations
        Url::parse(&self.identity.issuer)
            .map_err(|e| format!("identity.issuer is not a URL: {e}"))?;
        let redirect = Url::parse(&self.identity.redirect_url)
            .map_err(|e| format!("identity.redirect_url is not a URL: {e}"))?;
        if redirect.host_str().is_none() {
            return Err("identity.redirect_url must have a host".into());
        }
        if self.identity.client_name.trim().is_empty() {
            return Err("identity.client_name must not be empty".into());
        }
        if self.identity.request_timeout_ms == 0 {
            return Err("identity.request_timeout_ms must be > 0".into());
        }
        if !self.identity.scopes.iter().any(|s| s == "openid") {
            return Err("identity.scopes must include openid".into());
        }
        if self.identity.client_secret.is_some() && self.identity.client_id.is_none() {
            return Err("identity.client_secret requires identity.client_id".into());
        }
        // Pod validations
        let name = &self.pod.document_name;
        if name.is_empty() || name.contains('/') || name.contains('#') {
            return Err("pod.document_name must be a plain file name".into());
        }
        if self.pod.record_title.is_empty() {
            return Err("pod.record_title must not be empty".into());
        }
        if self.pod.private_path.starts_with('/') || !self.pod.private_path.ends_with('/') {
            return Err("pod.private_path must be relative and end with '/'".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.identity.request_timeout_ms))
    }

    pub fn oidc_client_config(&self) -> OidcClientConfig {
        OidcClientConfig {
            client_id: self.identity.client_id.clone(),
            client_secret: self.identity.client_secret.clone(),
            scopes: self.identity.scopes.clone(),
            discovery: DiscoveryConfig::default().with_allow_http(self.identity.allow_http),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity provider used when none is given on the command line.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Display name sent with dynamic client registration.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Pre-registered client; dynamic registration is used when unset.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Where the provider sends the user back to.
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Accept plain-HTTP issuers (local development only).
    #[serde(default)]
    pub allow_http: bool,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u32,
}

fn default_issuer() -> String {
    "https://solidcommunity.net".into()
}
fn default_client_name() -> String {
    podline_auth::DEFAULT_CLIENT_NAME.into()
}
fn default_redirect_url() -> String {
    "http://localhost:3000/".into()
}
fn default_scopes() -> Vec<String> {
    vec!["openid".into(), "offline_access".into(), "webid".into()]
}
fn default_request_timeout_ms() -> u32 {
    30_000
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            client_name: default_client_name(),
            client_id: None,
            client_secret: None,
            redirect_url: default_redirect_url(),
            scopes: default_scopes(),
            allow_http: false,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodConfig {
    /// File name of the demo document under the storage root.
    #[serde(default = "default_document_name")]
    pub document_name: String,
    #[serde(default = "default_record_title")]
    pub record_title: String,
    /// Path of the fallback storage root, relative to the WebID's origin.
    #[serde(default = "default_private_path")]
    pub private_path: String,
}

fn default_document_name() -> String {
    crate::roundtrip::DEFAULT_DOCUMENT_NAME.into()
}
fn default_record_title() -> String {
    crate::roundtrip::DEFAULT_RECORD_TITLE.into()
}
fn default_private_path() -> String {
    crate::roundtrip::DEFAULT_PRIVATE_PATH.into()
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            document_name: default_document_name(),
            record_title: default_record_title(),
            private_path: default_private_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default file looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "podline.toml";

    pub fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(format!("config file not found: {}", p.display()));
                }
                builder = builder.add_source(File::from(p.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., PODLINE__IDENTITY__ISSUER=https://idp.example
        builder = builder.add_source(
            Environment::with_prefix("PODLINE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
