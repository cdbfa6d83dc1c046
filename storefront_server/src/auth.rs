//! Shopper identification.
//!
//! There are two ways to be somebody here. Signed-in customers present an HS256 bearer token minted by the
//! identity service that shares `SFS_JWT_SECRET` with this server. Everyone else is a guest, identified by
//! whatever opaque value their client puts in the `X-Session-Id` header. The [`ShopperIdentity`] extractor
//! resolves either into a [`ShopperId`] so handlers never look at headers themselves.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use storefront_engine::db_types::ShopperId;

use crate::{config::AuthConfig, errors::ServerError};

pub const SESSION_ID_HEADER: &str = "X-Session-Id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The customer's stable user id.
    pub sub: String,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mints a token the way the identity service would. Used by tests and tooling.
    pub fn issue_token(&self, user_id: &str, valid_for: Duration) -> Result<String, ServerError> {
        let claims = JwtClaims { sub: user_id.to_string(), exp: (Utc::now() + valid_for).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServerError::Unspecified(format!("Could not issue access token. {e}")))
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, ServerError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map(|data| data.claims).map_err(|e| {
            debug!("💻️ Token validation failed. {e}");
            ServerError::CouldNotValidateAuthToken
        })
    }
}

/// Extractor wrapper around [`ShopperId`]. A bearer token wins over a session header when both are present.
pub struct ShopperIdentity(pub ShopperId);

fn identify(req: &HttpRequest) -> Result<ShopperId, ServerError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| ServerError::CouldNotValidateAuthToken)?;
        let token = value.strip_prefix("Bearer ").ok_or(ServerError::CouldNotValidateAuthToken)?;
        let issuer = req
            .app_data::<web::Data<TokenIssuer>>()
            .ok_or_else(|| ServerError::ConfigurationError("TokenIssuer is not registered".to_string()))?;
        let claims = issuer.validate(token)?;
        return Ok(ShopperId::Customer(claims.sub));
    }
    if let Some(session_id) = session_id_from_request(req) {
        return Ok(ShopperId::Guest(session_id));
    }
    Err(ServerError::NoShopperIdentity)
}

/// Reads the raw session id header, if any. The login-merge endpoint needs this alongside the bearer identity.
pub fn session_id_from_request(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl FromRequest for ShopperIdentity {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req).map(ShopperIdentity))
    }
}
