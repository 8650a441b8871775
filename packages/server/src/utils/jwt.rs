use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Identity-provider user ID
    pub exp: usize,  // Expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Keys and validation rules for bearer tokens.
pub struct JwtKeys {
    decoding: DecodingKey,
    encoding: Option<EncodingKey>,
    validation: Validation,
    issuer: Option<String>,
}

impl JwtKeys {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = config.jwt_secret.as_deref().filter(|s| !s.is_empty());
        let public_key = config.jwt_public_key.as_deref().filter(|s| !s.is_empty());

        let (decoding, encoding, algorithm) = match (secret, public_key) {
            (Some(secret), None) => (
                DecodingKey::from_secret(secret.as_bytes()),
                Some(EncodingKey::from_secret(secret.as_bytes())),
                Algorithm::HS256,
            ),
            (None, Some(pem)) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .context("auth.jwt_public_key is not a valid RSA PEM key")?,
                None,
                Algorithm::RS256,
            ),
            (Some(_), Some(_)) => bail!("Set only one of auth.jwt_secret and auth.jwt_public_key"),
            (None, None) => bail!("One of auth.jwt_secret or auth.jwt_public_key must be set"),
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }

        Ok(Self {
            decoding,
            encoding,
            validation,
            issuer: config.issuer.clone(),
        })
    }

    /// Sign a token shaped like the identity provider's. Requires a shared secret.
    pub fn sign(&self, user_id: &str, role: Option<&str>, ttl: Duration) -> Result<String> {
        let key = self
            .encoding
            .as_ref()
            .context("Signing tokens requires auth.jwt_secret")?;

        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .context("Token expiration out of range")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_owned(),
            exp: expiration as usize,
            role: role.map(str::to_owned),
            iss: self.issuer.clone(),
        };

        Ok(encode(&Header::default(), &claims, key)?)
    }

    /// Verify and decode a JWT token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(token_data.claims)
    }
}
