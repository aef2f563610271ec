use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{config::Config, service::error::ServiceError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Lifetime of every issued signaling token.
pub const TOKEN_TTL_SECONDS: i64 = 300;

const TOKEN_VERSION: &str = "04";
const SECRET_LEN: usize = 32;
const IV_LEN: usize = 16;
const IV_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignalingToken {
    pub token: String,
    pub effective_time_in_seconds: i64,
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    app_id: u32,
    user_id: &'a str,
    nonce: i32,
    ctime: i64,
    expire: i64,
    payload: &'a str,
}

#[derive(Debug, Clone)]
struct Credentials {
    app_id: u32,
    server_secret: String,
}

/// Issues short-lived credentials for the real-time call provider.
///
/// The claims JSON is encrypted with AES-256-CBC (PKCS7) under the server
/// secret. Token layout, base64 encoded after the `04` prefix:
/// `expire (i64 BE) | iv length (u16 BE) | iv | cipher length (u16 BE) | cipher`.
///
/// The IV and nonce come from an HMAC of the app id, user id and issue time,
/// so a given `issued_at` always yields the same token.
#[derive(Debug, Clone)]
pub struct SignalingTokenIssuer {
    credentials: Option<Credentials>,
}

impl SignalingTokenIssuer {
    pub fn new(app_id: Option<u32>, server_secret: Option<String>) -> Self {
        let credentials = match (app_id, server_secret) {
            (Some(app_id), Some(server_secret)) => Some(Credentials { app_id, server_secret }),
            _ => None,
        };
        Self { credentials }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.zego_app_id, config.zego_server_secret.clone())
    }

    pub fn issue(&self, user_id: &str) -> Result<SignalingToken, ServiceError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    pub fn issue_at(&self, user_id: &str, issued_at: i64) -> Result<SignalingToken, ServiceError> {
        let credentials = self.credentials()?;

        if user_id.is_empty() {
            return Err(ServiceError::InvalidArgument("User id is required".to_string()));
        }

        let (iv, nonce) = derive_iv_and_nonce(credentials, user_id, issued_at)?;
        let expire = issued_at + TOKEN_TTL_SECONDS;

        let plaintext = serde_json::to_vec(&TokenClaims {
            app_id: credentials.app_id,
            user_id,
            nonce,
            ctime: issued_at,
            expire,
            payload: "",
        })
        .map_err(|e| ServiceError::Config(format!("Failed to encode token claims: {}", e)))?;

        let cipher = Aes256CbcEnc::new_from_slices(credentials.server_secret.as_bytes(), &iv)
            .map_err(|e| ServiceError::Config(format!("Invalid signing key: {}", e)))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

        let cipher_len = u16::try_from(cipher.len())
            .map_err(|_| ServiceError::InvalidArgument("User id is too long".to_string()))?;

        let mut packed = Vec::with_capacity(8 + 2 + IV_LEN + 2 + cipher.len());
        packed.extend_from_slice(&expire.to_be_bytes());
        packed.extend_from_slice(&(IV_LEN as u16).to_be_bytes());
        packed.extend_from_slice(&iv);
        packed.extend_from_slice(&cipher_len.to_be_bytes());
        packed.extend_from_slice(&cipher);

        Ok(SignalingToken {
            token: format!("{}{}", TOKEN_VERSION, STANDARD.encode(packed)),
            effective_time_in_seconds: TOKEN_TTL_SECONDS,
        })
    }

    fn credentials(&self) -> Result<&Credentials, ServiceError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| ServiceError::Config("ZEGO_APP_ID and ZEGO_SERVER_SECRET must be set".to_string()))?;

        if credentials.app_id == 0 {
            return Err(ServiceError::Config("ZEGO_APP_ID must be non-zero".to_string()));
        }
        if credentials.server_secret.len() != SECRET_LEN {
            return Err(ServiceError::Config(format!(
                "ZEGO_SERVER_SECRET must be {} characters",
                SECRET_LEN
            )));
        }

        Ok(credentials)
    }
}

/// Alphanumeric IV (the provider expects a printable 16 character string)
/// and a signed 32 bit nonce, both taken from one HMAC-SHA256 digest.
fn derive_iv_and_nonce(
    credentials: &Credentials,
    user_id: &str,
    issued_at: i64,
) -> Result<([u8; IV_LEN], i32), ServiceError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(credentials.server_secret.as_bytes())
        .map_err(|e| ServiceError::Config(format!("Invalid signing key: {}", e)))?;
    mac.update(&credentials.app_id.to_be_bytes());
    mac.update(&issued_at.to_be_bytes());
    mac.update(user_id.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut iv = [0u8; IV_LEN];
    for (slot, byte) in iv.iter_mut().zip(digest.iter()) {
        *slot = IV_CHARSET[*byte as usize % IV_CHARSET.len()];
    }
    let nonce = i32::from_be_bytes([digest[16], digest[17], digest[18], digest[19]]);

    Ok((iv, nonce))
}
