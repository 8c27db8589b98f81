use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::{CallerIdentity, Role, join_authorities, parse_authorities};

/// Claims of a back-office access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    /// Comma-separated authorities, e.g. `ROLE_ADMIN,ROLE_USER`.
    pub authorities: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
}

impl TokenClaims {
    pub fn identity(&self) -> CallerIdentity {
        CallerIdentity::new(self.sub.clone(), parse_authorities(&self.authorities))
    }
}

/// HS256 token issuer/verifier shared by the auth service and the gateway.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiry_minutes: i64,
}

impl JwtService {
    pub fn new(secret: &str, issuer: impl Into<String>, expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            expiry_minutes,
        }
    }

    pub fn issue(&self, username: &str, roles: &[Role]) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: username.to_string(),
            iss: self.issuer.clone(),
            authorities: join_authorities(roles),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::minutes(self.expiry_minutes)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    /// Verifies signature, issuer, expiry and not-before.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    pub fn expiry_minutes(&self) -> i64 {
        self.expiry_minutes
    }
}
