use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use crate::logger::*;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub enum KeyMaterial {
    Secret(Vec<u8>),
    Pem {
        private_pem: Vec<u8>,
        public_pem: Vec<u8>,
    },
}

pub struct CodecConfig {
    pub algorithm: SigningAlgorithm,
    pub key: KeyMaterial,
    pub access_ttl_minutes: u32,
}

#[derive(Serialize)]
struct OutgoingClaims<'a> {
    #[serde(flatten)]
    principal: &'a Principal,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct IncomingClaims {
    #[serde(flatten)]
    principal: Principal,
    iat: i64,
    exp: i64,
}

pub struct JwtCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: u32,
    clock: Arc<dyn Clock>,
}

impl JwtCodec {
    pub fn new(cfg: CodecConfig, clock: Arc<dyn Clock>) -> Result<Self, CodecError> {
        if cfg.access_ttl_minutes == 0 {
            return Err(CodecError::Key("access token ttl must be positive".to_string()));
        }
        let (encoding_key, decoding_key) = build_keys(cfg.algorithm, &cfg.key)?;
        Ok(JwtCodec {
            algorithm: jwt_algorithm(cfg.algorithm),
            encoding_key,
            decoding_key,
            ttl_minutes: cfg.access_ttl_minutes,
            clock,
        })
    }

    fn validation(&self) -> Validation {
        // Expiry is checked against the injected clock instead.
        let mut v = Validation::new(self.algorithm);
        v.validate_exp = false;
        v.validate_aud = false;
        v.leeway = 0;
        v
    }
}

fn jwt_algorithm(algorithm: SigningAlgorithm) -> Algorithm {
    match algorithm {
        SigningAlgorithm::HS256 => Algorithm::HS256,
        SigningAlgorithm::HS384 => Algorithm::HS384,
        SigningAlgorithm::HS512 => Algorithm::HS512,
        SigningAlgorithm::RS256 => Algorithm::RS256,
        SigningAlgorithm::RS384 => Algorithm::RS384,
        SigningAlgorithm::RS512 => Algorithm::RS512,
        SigningAlgorithm::ES256 => Algorithm::ES256,
        SigningAlgorithm::ES384 => Algorithm::ES384,
    }
}

fn build_keys(
    algorithm: SigningAlgorithm,
    key: &KeyMaterial,
) -> Result<(EncodingKey, DecodingKey), CodecError> {
    let key_err = |e: jsonwebtoken::errors::Error| CodecError::Key(e.to_string());
    match (algorithm, key) {
        (alg, KeyMaterial::Secret(secret)) if alg.uses_shared_secret() => {
            if secret.is_empty() {
                return Err(CodecError::Key("empty shared secret".to_string()));
            }
            Ok((
                EncodingKey::from_secret(secret),
                DecodingKey::from_secret(secret),
            ))
        }
        (
            SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512,
            KeyMaterial::Pem {
                private_pem,
                public_pem,
            },
        ) => Ok((
            EncodingKey::from_rsa_pem(private_pem).map_err(key_err)?,
            DecodingKey::from_rsa_pem(public_pem).map_err(key_err)?,
        )),
        (
            SigningAlgorithm::ES256 | SigningAlgorithm::ES384,
            KeyMaterial::Pem {
                private_pem,
                public_pem,
            },
        ) => Ok((
            EncodingKey::from_ec_pem(private_pem).map_err(key_err)?,
            DecodingKey::from_ec_pem(public_pem).map_err(key_err)?,
        )),
        (alg, _) => Err(CodecError::Key(format!(
            "key material does not fit algorithm {:?}",
            alg
        ))),
    }
}

fn whole_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

fn classify(e: jsonwebtoken::errors::Error) -> CodecError {
    match e.kind() {
        ErrorKind::ExpiredSignature => CodecError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => CodecError::InvalidSignature,
        _ => CodecError::Malformed(e.to_string()),
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, principal: &Principal) -> Result<SignedToken, CodecError> {
        let issued_at = whole_seconds(self.clock.now());
        let expires_at = issued_at + Duration::minutes(i64::from(self.ttl_minutes));
        let claims = OutgoingClaims {
            principal,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(SignedToken(token))
    }

    fn decode(&self, token: &SignedToken) -> Result<Claims, CodecError> {
        let data = decode::<IncomingClaims>(token.as_str(), &self.decoding_key, &self.validation())
            .map_err(classify)?;
        let IncomingClaims {
            principal,
            iat,
            exp,
        } = data.claims;

        let issued_at = DateTime::from_timestamp(iat, 0)
            .ok_or_else(|| CodecError::Malformed("iat out of range".to_string()))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| CodecError::Malformed("exp out of range".to_string()))?;
        if self.clock.now() >= expires_at {
            trace!(user_id = %principal.user_id, %expires_at, "token past expiry");
            return Err(CodecError::Expired);
        }

        Ok(Claims {
            principal,
            issued_at,
            expires_at,
        })
    }

    fn ttl_minutes(&self) -> u32 {
        self.ttl_minutes
    }
}
