use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid RSA private key PEM: {0}")]
    InvalidPem(String),

    #[error("failed to derive public key PEM: {0}")]
    PublicKeyDerivation(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Signing and verification key material for one rotation epoch pair. The
/// current epoch signs and verifies; the previous epoch, when present,
/// verifies only, so tokens issued before a rotation stay valid until they
/// are refreshed under the current key.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    previous: Option<DecodingKey>,
}

impl TokenKeys {
    /// Build key material from private-key PEMs (PKCS#8 or PKCS#1). The
    /// verification halves are derived from the private keys, so
    /// configuration only ever carries the private PEMs.
    pub fn from_private_pems(current: &str, previous: Option<&str>) -> Result<Self, KeyError> {
        let encoding = EncodingKey::from_rsa_pem(current.as_bytes())
            .map_err(|e| KeyError::InvalidPem(e.to_string()))?;
        let decoding = derive_decoding_key(current)?;
        let previous = previous.map(derive_decoding_key).transpose()?;
        Ok(Self {
            encoding,
            decoding,
            previous,
        })
    }
}

fn derive_decoding_key(private_pem: &str) -> Result<DecodingKey, KeyError> {
    let private_key = match RsaPrivateKey::from_pkcs8_pem(private_pem) {
        Ok(key) => key,
        Err(_) => RsaPrivateKey::from_pkcs1_pem(private_pem)
            .map_err(|e| KeyError::InvalidPem(e.to_string()))?,
    };
    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::PublicKeyDerivation(e.to_string()))?;
    DecodingKey::from_rsa_pem(public_pem.as_bytes())
        .map_err(|e| KeyError::PublicKeyDerivation(e.to_string()))
}

/// Verifies inbound bearer tokens and issues replacements. Tokens carry a
/// subject and an expiry, nothing else; validity is entirely signature +
/// expiry, no server-side session state.
pub struct TokenAuthenticator {
    keys: TokenKeys,
    lifetime: chrono::Duration,
}

impl TokenAuthenticator {
    pub fn new(keys: TokenKeys, lifetime: chrono::Duration) -> Self {
        Self { keys, lifetime }
    }

    /// Validate a token and return its subject. The signing algorithm must
    /// be in the RSA family before any signature work happens, which shuts
    /// down alg-downgrade forgeries. A signature that fails under the
    /// current key is retried under the previous key, if one is configured;
    /// every other failure is terminal.
    pub fn verify(&self, token: &str) -> ApiResult<String> {
        let header = decode_header(token)
            .map_err(|_| ApiError::Unauthorized("malformed token".to_string()))?;
        if !matches!(
            header.alg,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
        ) {
            return Err(ApiError::Unauthorized(
                "unexpected signing method".to_string(),
            ));
        }

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;

        let data = match decode::<Claims>(token, &self.keys.decoding, &validation) {
            Ok(data) => data,
            Err(err) if matches!(err.kind(), ErrorKind::InvalidSignature) => {
                let previous = self.keys.previous.as_ref().ok_or_else(|| {
                    ApiError::Unauthorized("invalid token signature".to_string())
                })?;
                decode::<Claims>(token, previous, &validation).map_err(map_verification_error)?
            }
            Err(err) => return Err(map_verification_error(err)),
        };

        Ok(data.claims.sub)
    }

    /// Issue a token for the subject, signed with the current key only,
    /// expiring `lifetime` from now.
    pub fn sign(&self, subject_id: &str) -> ApiResult<String> {
        let claims = Claims {
            sub: subject_id.to_string(),
            exp: (Utc::now() + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::RS512), &claims, &self.keys.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
    }
}

fn map_verification_error(err: jsonwebtoken::errors::Error) -> ApiError {
    let message = match err.kind() {
        ErrorKind::ExpiredSignature => "token has expired",
        ErrorKind::InvalidSignature => "invalid token signature",
        ErrorKind::MissingRequiredClaim(_) => "improper token",
        _ => "malformed token",
    };
    ApiError::Unauthorized(message.to_string())
}
