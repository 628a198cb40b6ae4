//! Admin authentication: password login and signed session tokens.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Subject embedded in every admin session token.
const ADMIN_SUBJECT: &str = "admin";

/// Hashes an admin password with HMAC-SHA256 keyed by the signing secret.
///
/// Returns a 64-character lowercase hex-encoded MAC, the format expected in
/// `ADMIN_PASSWORD_HASH`.
pub fn hash_password(signing_secret: &str, password: &str) -> String {
    hex::encode(mac_for(signing_secret, password.as_bytes()).finalize().into_bytes())
}

fn mac_for(signing_secret: &str, data: &[u8]) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(data);
    mac
}

/// An issued admin session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Service for admin login and bearer token verification.
///
/// Tokens have the form `base64url(claims).base64url(hmac)` where the MAC is
/// computed over the encoded claims with the server signing secret. Nothing is
/// stored server-side, so tokens stay valid across restarts until they expire
/// or the secret is rotated.
pub struct AuthService {
    signing_secret: String,
    admin_password_hash: Option<String>,
    session_ttl: Duration,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key for password hashes and tokens
    /// - `admin_password_hash` - hex HMAC of the admin password; `None` disables login
    /// - `session_ttl` - lifetime of issued tokens
    pub fn new(
        signing_secret: String,
        admin_password_hash: Option<String>,
        session_ttl: std::time::Duration,
    ) -> Self {
        Self {
            signing_secret,
            admin_password_hash,
            session_ttl: Duration::from_std(session_ttl).unwrap_or(Duration::hours(12)),
        }
    }

    /// Verifies the admin password and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the password is wrong or no admin
    /// password is configured.
    pub fn login(&self, password: &str) -> Result<Session, AppError> {
        let Some(expected_hex) = self.admin_password_hash.as_deref() else {
            warn!("Admin login attempted but ADMIN_PASSWORD_HASH is not set");
            return Err(invalid_credentials());
        };

        let expected = hex::decode(expected_hex.trim()).map_err(|_| {
            warn!("ADMIN_PASSWORD_HASH is not valid hex");
            invalid_credentials()
        })?;

        mac_for(&self.signing_secret, password.as_bytes())
            .verify_slice(&expected)
            .map_err(|_| invalid_credentials())?;

        Ok(self.issue_token(Utc::now()))
    }

    /// Verifies a bearer token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, forged,
    /// or expired.
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        self.authenticate_at(token, Utc::now())
    }

    fn issue_token(&self, now: DateTime<Utc>) -> Session {
        let expires_at = now + self.session_ttl;
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        // Serializing a struct of a String and two integers cannot fail.
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
        let signature = URL_SAFE_NO_PAD.encode(
            mac_for(&self.signing_secret, payload.as_bytes())
                .finalize()
                .into_bytes(),
        );

        debug!(expires_at = %expires_at, "Issued admin session");

        Session {
            token: format!("{payload}.{signature}"),
            expires_at,
        }
    }

    fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        let (payload, signature) = token.split_once('.').ok_or_else(invalid_token)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| invalid_token())?;
        mac_for(&self.signing_secret, payload.as_bytes())
            .verify_slice(&signature)
            .map_err(|_| invalid_token())?;

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or_else(invalid_token)?;

        if claims.sub != ADMIN_SUBJECT {
            return Err(invalid_token());
        }

        if now.timestamp() >= claims.exp {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Token expired" }),
            ));
        }

        Ok(())
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid password", json!({}))
}

fn invalid_token() -> AppError {
    AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid token" }))
}
