//! Request authentication boundary.
//!
//! Turns a request into the [`CustomerId`] it acts for. The default [`TokenAuthenticator`]
//! verifies the HS256 token issued by the login service; [`GatewayAuthenticator`] is only for
//! deployments behind a gateway that already did so.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{AppEnvironment, AuthConfig, AuthMode};
use crate::engagement::CustomerId;
use crate::error::ApiError;

/// Header carrying the customer id once the gateway has validated `x-auth-token`.
pub const CUSTOMER_HEADER: &str = "x-customer-cif";
pub const TOKEN_HEADER: &str = "x-auth-token";
pub const CUSTOMER_QUERY_PARAM: &str = "cif";

/// Lifetime of tokens handed out by [`issue_token`].
pub const TOKEN_TTL_MINUTES: i64 = 30;

pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        headers: &HeaderMap,
        query: &[(String, String)],
    ) -> Result<CustomerId, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Please either provide the Customer CIF in the querystring (?cif=), or provide an auth token in the x-auth-token header")]
    Missing,
    #[error("customer identifier must not be blank")]
    Blank,
    #[error("auth token was not accepted by the gateway")]
    Rejected,
    #[error("invalid auth token: {0}")]
    InvalidToken(String),
    #[error("unable to sign auth token: {0}")]
    Signing(String),
}

/// Pick the authenticator `serve` should use.
pub fn authenticator_for(config: &AuthConfig) -> Arc<dyn Authenticator> {
    match config.mode {
        AuthMode::Token => Arc::new(TokenAuthenticator::new(config)),
        AuthMode::Gateway => Arc::new(GatewayAuthenticator),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    iss: String,
    exp: i64,
}

/// Verifies `x-auth-token`: HS256 signature, expiry and issuer. The subject is the customer id.
#[derive(Clone)]
pub struct TokenAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
        }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(
        &self,
        headers: &HeaderMap,
        query: &[(String, String)],
    ) -> Result<CustomerId, AuthError> {
        if let Some(cif) = query_override(query) {
            return non_blank(cif);
        }

        let token = headers
            .get(TOKEN_HEADER)
            .ok_or(AuthError::Missing)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken("header is not valid ASCII".to_string()))?;

        let data = decode::<TokenClaims>(token.trim(), &self.key, &self.validation)
            .map_err(|err| AuthError::InvalidToken(format!("{:?}", err.kind())))?;
        non_blank(&data.claims.sub)
    }
}

/// Sign a token for `customer_id` the way the login service does.
pub fn issue_token(
    config: &AuthConfig,
    customer_id: &CustomerId,
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    let claims = TokenClaims {
        sub: customer_id.to_string(),
        iss: config.issuer.clone(),
        exp: (issued_at + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.signing_key.as_bytes()),
    )
    .map_err(|err| AuthError::Signing(err.to_string()))
}

/// Accepts a single `?cif=` override, otherwise the gateway-populated customer header.
#[derive(Debug, Default, Clone, Copy)]
pub struct GatewayAuthenticator;

impl Authenticator for GatewayAuthenticator {
    fn authenticate(
        &self,
        headers: &HeaderMap,
        query: &[(String, String)],
    ) -> Result<CustomerId, AuthError> {
        if let Some(cif) = query_override(query) {
            return non_blank(cif);
        }

        match headers.get(CUSTOMER_HEADER) {
            Some(value) => {
                let cif = value.to_str().map_err(|_| AuthError::Rejected)?;
                non_blank(cif)
            }
            // A token without a resolved customer means the gateway refused it.
            None if headers.contains_key(TOKEN_HEADER) => Err(AuthError::Rejected),
            None => Err(AuthError::Missing),
        }
    }
}

/// The `?cif=` value when exactly one is present.
fn query_override(query: &[(String, String)]) -> Option<&str> {
    let mut overrides = query
        .iter()
        .filter(|(key, _)| key == CUSTOMER_QUERY_PARAM)
        .map(|(_, value)| value.as_str());
    match (overrides.next(), overrides.next()) {
        (Some(cif), None) => Some(cif),
        _ => None,
    }
}

fn non_blank(value: &str) -> Result<CustomerId, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AuthError::Blank)
    } else {
        Ok(CustomerId::new(trimmed))
    }
}

/// Request-independent settings shared by every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub authenticator: Arc<dyn Authenticator>,
    pub environment: AppEnvironment,
}

impl ApiContext {
    pub fn new(authenticator: Arc<dyn Authenticator>, environment: AppEnvironment) -> Self {
        Self {
            authenticator,
            environment,
        }
    }

    pub fn fail(&self, error: impl Into<ApiError>) -> ApiError {
        error.into().for_environment(self.environment)
    }
}

/// Extractor yielding the customer a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCustomer(pub CustomerId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    ApiContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = ApiContext::from_ref(state);
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|err| context.fail(ApiError::bad_request(err.body_text())))?;

        context
            .authenticator
            .authenticate(&parts.headers, &query)
            .map(Self)
            .map_err(|err| context.fail(err))
    }
}
