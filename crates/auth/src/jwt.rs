use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default lifetime of an admin access token
pub const DEFAULT_TOKEN_EXPIRATION_MINUTES: i64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Organization name
    pub exp: i64,    // Expiration time
    #[serde(default)]
    pub iat: i64, // Issued at; optional on incoming tokens
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    token_exp_minutes: i64,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            token_exp_minutes: DEFAULT_TOKEN_EXPIRATION_MINUTES,
        }
    }

    pub fn with_expiration_minutes(mut self, minutes: i64) -> Self {
        self.token_exp_minutes = minutes;
        self
    }

    /// Lifetime of issued tokens, for `expires_in` in login responses
    pub fn expires_in_seconds(&self) -> i64 {
        self.token_exp_minutes * 60
    }

    /// Issue an access token identifying `organization_name`
    pub fn issue(&self, organization_name: &str) -> Result<String> {
        self.issue_at(organization_name, Utc::now())
    }

    fn issue_at(&self, organization_name: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let exp = issued_at + Duration::minutes(self.token_exp_minutes);

        let claims = Claims {
            sub: organization_name.to_string(),
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the organization name it was issued for.
    ///
    /// Every failure (bad signature, malformed, expired, missing subject)
    /// collapses into `InvalidToken`.
    pub fn validate(&self, token: &str) -> Result<String> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if token_data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("missing subject claim".to_string()));
        }

        Ok(token_data.claims.sub)
    }
}
