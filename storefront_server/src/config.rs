use std::env;

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;
use storefront_common::Secret;

use crate::errors::ServerError;

const DEFAULT_SFS_HOST: &str = "127.0.0.1";
const DEFAULT_SFS_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Credentials and secrets for the payment gateway, including the webhook signing secret.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFS_HOST.to_string(),
            port: DEFAULT_SFS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFS_HOST").ok().unwrap_or_else(|| DEFAULT_SFS_HOST.into());
        let port = env::var("SFS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFS_PORT. {e} Using the default, {DEFAULT_SFS_PORT}, instead."
                    );
                    DEFAULT_SFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFS_PORT);
        let database_url = env::var("SFS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SFS_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, razorpay }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
/// Settings for validating customer access tokens.
///
/// The server does not issue tokens itself; it shares an HMAC secret with the identity service that does, and
/// accepts any unexpired HS256 token signed with it.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this, since no customer token will validate across restarts. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SFS_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SFS_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "SFS_JWT_SECRET must be at least 32 characters long.".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
